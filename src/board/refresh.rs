//! Display multiplexing.
//!
//! Only one digit can be lit per latched frame, so the four digits are drawn one after another,
//! each held for the bus settle time, fast enough that the eye sees all four at once. Every frame
//! also carries the relay byte, because relays and display share one shift chain: the refresh
//! is what delivers relay changes to the hardware.

use core::ops::Deref;

use crate::board::{Board, BoardState};
use crate::frame::{BusFrame, DigitSelect};
use crate::interface::OutputBus;
use crate::mutex::IOMutex;
use crate::segments::{SegmentPattern, DIGITS};

/// Drives the output bus from a [`Board`]'s shared state.
///
/// `BD` is anything that dereferences to the board: a plain `&Board` when the caller drives
/// [`tick`](Refresher::tick) from its own timer or task, or an `Arc<Board>` for the threaded
/// [`spawn`](Refresher::spawn).
pub struct Refresher<BD, B> {
    board: BD,
    bus: B,
    position: u8,
}

impl<M, BD, B> Refresher<BD, B>
where
    M: IOMutex<BoardState>,
    BD: Deref<Target = Board<M>>,
    B: OutputBus,
{
    /// Create a refresher for `board` on `bus`, starting at the leftmost digit.
    pub fn new(board: BD, bus: B) -> Self {
        Self {
            board,
            bus,
            position: 0,
        }
    }

    /// The digit position the next `tick` will draw, 0 (leftmost) to 3.
    pub fn position(&self) -> u8 {
        self.position
    }

    /// Draw one digit: snapshot the relays and that digit's pattern, then latch them. The board
    /// lock is released before the bus transfer starts.
    pub fn tick(&mut self) -> Result<(), B::Error> {
        let position = self.position;
        let (relays, segments) = self.board.snapshot(position as usize);
        self.position = (position + 1) % DIGITS as u8;

        let frame = BusFrame::new(relays, DigitSelect::Digit(position), segments);
        log::trace!("refresh {:02x?}", frame.to_bytes());
        self.bus.transmit(&frame)
    }

    /// Draw all four digits, starting from the current position.
    pub fn cycle(&mut self) -> Result<(), B::Error> {
        for _ in 0..DIGITS {
            self.tick()?;
        }
        Ok(())
    }

    /// Latch `pattern` on the digits in `select` in a single frame, with the current relays.
    /// Without further refresh it stays lit only as long as the hardware holds it; useful for a
    /// lamp test with [`DigitSelect::Leading`].
    pub fn hold(&mut self, select: DigitSelect, pattern: SegmentPattern) -> Result<(), B::Error> {
        let relays = self.board.relays();
        self.bus.transmit(&BusFrame::new(relays, select, pattern))
    }

    /// Latch the current relays with every digit dark.
    pub fn blank(&mut self) -> Result<(), B::Error> {
        self.hold(DigitSelect::None, SegmentPattern::BLANK)
    }

    /// Give back the board handle and the bus.
    pub fn release(self) -> (BD, B) {
        (self.board, self.bus)
    }
}

#[cfg(feature = "std")]
pub use self::threaded::RefreshHandle;

#[cfg(feature = "std")]
mod threaded {
    use super::*;

    use std::fmt::Debug;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    /// Owns the refresh thread started by [`Refresher::spawn`]. Dropping it stops the thread too,
    /// but only [`shutdown`](RefreshHandle::shutdown) gives the bus back.
    pub struct RefreshHandle<B> {
        running: Arc<AtomicBool>,
        thread: Option<JoinHandle<B>>,
    }

    impl<B> RefreshHandle<B> {
        pub fn is_running(&self) -> bool {
            self.thread.as_ref().is_some_and(|t| !t.is_finished())
        }

        /// Stop refreshing, leave the display dark with the relays still latched, and return
        /// the bus. Errors only if the refresh thread panicked.
        pub fn shutdown(mut self) -> thread::Result<B> {
            self.running.store(false, Ordering::Release);
            match self.thread.take() {
                Some(thread) => thread.join(),
                None => Err(Box::new("refresh thread already joined")),
            }
        }
    }

    impl<B> Drop for RefreshHandle<B> {
        fn drop(&mut self) {
            self.running.store(false, Ordering::Release);
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }

    impl<M, B> Refresher<Arc<Board<M>>, B>
    where
        M: IOMutex<BoardState> + Send + Sync + 'static,
        B: OutputBus + Send + 'static,
        B::Error: Debug,
    {
        /// Run the refresh loop on a dedicated thread until the returned handle is shut down.
        /// Bus errors are logged and the loop carries on with the next digit.
        pub fn spawn(self) -> io::Result<RefreshHandle<B>> {
            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            let mut refresher = self;
            let thread = thread::Builder::new()
                .name("display-refresh".into())
                .spawn(move || {
                    log::debug!("display refresh started");
                    while flag.load(Ordering::Acquire) {
                        if let Err(e) = refresher.tick() {
                            log::warn!("display refresh: bus error {:?}", e);
                        }
                    }
                    if let Err(e) = refresher.blank() {
                        log::warn!("display refresh: could not blank display: {:?}", e);
                    }
                    log::debug!("display refresh stopped");
                    refresher.release().1
                })?;
            Ok(RefreshHandle {
                running,
                thread: Some(thread),
            })
        }
    }

    impl<M: IOMutex<BoardState> + Send + Sync + 'static> Board<M> {
        /// Start refreshing `bus` from this board on a background thread. Shorthand for
        /// `Refresher::new(board.clone(), bus).spawn()`.
        pub fn start_refresh<B>(self: &Arc<Self>, bus: B) -> io::Result<RefreshHandle<B>>
        where
            B: OutputBus + Send + 'static,
            B::Error: Debug,
        {
            Refresher::new(self.clone(), bus).spawn()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::frame::DigitSelectMask;
    use crate::interface::test_spy::{BrokenBus, FrameSpy};
    use crate::mutex::DefaultMutex;
    use crate::segments::{char_to_segments, BLANK_DISPLAY};

    type TestBoard = Board<DefaultMutex<BoardState>>;

    fn select(pos: u8) -> DigitSelectMask {
        DigitSelect::Digit(pos).into()
    }

    #[test]
    fn tick_walks_digits_left_to_right() {
        let board = TestBoard::default();
        board.display("1234");
        let spy = FrameSpy::new();
        let mut refresher = Refresher::new(&board, spy.split());

        assert!(refresher.cycle().is_ok());
        assert!(refresher.tick().is_ok());

        let frames = spy.frames();
        assert_eq!(frames.len(), 5);
        for (i, c) in "12341".chars().enumerate() {
            assert_eq!(frames[i].digits, select((i % 4) as u8));
            assert_eq!(frames[i].segments, char_to_segments(c));
        }
        assert_eq!(refresher.position(), 1);
    }

    #[test]
    fn every_frame_carries_relays() {
        let board = TestBoard::new(BoardConfig::default().reset_relays_on(true));
        let spy = FrameSpy::new();
        let mut refresher = Refresher::new(&board, spy.split());

        assert!(refresher.cycle().is_ok());
        assert!(spy.frames().iter().all(|f| f.relays == 0xFF));
    }

    #[test]
    fn relay_change_reaches_next_frame() {
        let board = TestBoard::default();
        let spy = FrameSpy::new();
        let mut refresher = Refresher::new(&board, spy.split());

        assert!(refresher.tick().is_ok());
        assert_eq!(spy.last().map(|f| f.relays), Some(0));

        board.set_relays(0b1010_0000);
        assert!(refresher.tick().is_ok());
        assert_eq!(spy.last().map(|f| f.relays), Some(0b1010_0000));

        board.set_relay(0, true);
        assert!(refresher.tick().is_ok());
        assert_eq!(spy.last().map(|f| f.relays), Some(0b1010_0001));
    }

    #[test]
    fn display_change_does_not_touch_relays() {
        let board = TestBoard::default();
        board.set_relays(0b0000_0110);
        let spy = FrameSpy::new();
        let mut refresher = Refresher::new(&board, spy.split());

        assert!(refresher.cycle().is_ok());
        board.display(3.14);
        assert!(refresher.cycle().is_ok());

        let frames = spy.frames();
        assert!(frames.iter().all(|f| f.relays == 0b0000_0110));
        assert_eq!(frames[5].segments, char_to_segments('3').with_decimal_point());
    }

    #[test]
    fn hold_and_blank() {
        let board = TestBoard::default();
        board.set_relays(0b0000_0001);
        let spy = FrameSpy::new();
        let mut refresher = Refresher::new(&board, spy.split());

        assert!(refresher
            .hold(DigitSelect::Leading(4), char_to_segments('8'))
            .is_ok());
        assert!(refresher.blank().is_ok());

        let frames = spy.frames();
        assert_eq!(frames[0].to_bytes(), [0b0000_0001, 0b1111_0000, 0b0111_1111]);
        assert_eq!(frames[1].to_bytes(), [0b0000_0001, 0b1111_1111, 0b0000_0000]);
        // A single-shot write does not move the multiplexer.
        assert_eq!(refresher.position(), 0);
    }

    #[test]
    fn errors_propagate() {
        let board = TestBoard::default();
        let mut refresher = Refresher::new(&board, BrokenBus);
        assert_eq!(refresher.tick(), Err("bus unplugged"));
        assert_eq!(refresher.cycle(), Err("bus unplugged"));
        // The position still advances past the failed digit.
        assert_eq!(refresher.position(), 2);
    }

    #[cfg(feature = "std")]
    mod threaded {
        use super::*;
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::time::{Duration, Instant};

        fn wait_for_frames(spy: &FrameSpy, count: usize) {
            let deadline = Instant::now() + Duration::from_secs(5);
            while spy.frames().len() < count {
                assert!(Instant::now() < deadline, "refresh thread stalled");
                std::thread::sleep(Duration::from_millis(1));
            }
        }

        #[test]
        fn spawned_refresh_runs_until_shutdown() {
            let board = Arc::new(TestBoard::default());
            board.display("8888");
            let spy = FrameSpy::new().yielding();
            let handle = board.start_refresh(spy.split()).unwrap();
            assert!(handle.is_running());

            wait_for_frames(&spy, 8);
            assert!(handle.shutdown().is_ok());

            let frames = spy.frames();
            let last = frames.last().unwrap();
            assert_eq!(last.digits, DigitSelectMask::from(DigitSelect::None));
            assert_eq!(last.segments, SegmentPattern::BLANK);
            // Before the final blank frame, positions cycle in order.
            for (i, f) in frames[..frames.len() - 1].iter().enumerate() {
                assert_eq!(f.digits, select((i % 4) as u8));
            }
        }

        #[test]
        fn spawned_refresh_survives_bus_errors() {
            let board = Arc::new(TestBoard::default());
            let handle = Refresher::new(board.clone(), BrokenBus).spawn().unwrap();
            std::thread::sleep(Duration::from_millis(5));
            assert!(handle.is_running());
            assert!(handle.shutdown().is_ok());
        }

        #[test]
        fn dropping_handle_stops_thread() {
            let board = Arc::new(TestBoard::default());
            let spy = FrameSpy::new().yielding();
            let handle = board.start_refresh(spy.split()).unwrap();
            wait_for_frames(&spy, 4);
            drop(handle);

            let settled = spy.frames().len();
            std::thread::sleep(Duration::from_millis(5));
            assert_eq!(spy.frames().len(), settled);
        }

        #[test]
        fn relay_bytes_never_torn() {
            let board = Arc::new(TestBoard::default());
            board.display(BLANK_DISPLAY);
            let spy = FrameSpy::new().yielding();
            let handle = board.start_refresh(spy.split()).unwrap();

            // Every value the register ever holds, as seen by the only writer.
            let mut written = HashSet::new();
            written.insert(board.relays());
            let mut expected = board.relays();
            for i in 0..4_000u32 {
                let index = (i % 8) as u8;
                let on = (i / 8) % 2 == 0;
                if i % 97 == 0 {
                    expected = (i % 256) as u8;
                    board.set_relays(expected);
                } else {
                    if on {
                        expected |= 1 << index;
                    } else {
                        expected &= !(1 << index);
                    }
                    board.set_relay(index, on);
                }
                written.insert(expected);
            }
            assert_eq!(board.relays(), expected);

            wait_for_frames(&spy, 16);
            let sent_after_last_write = spy.frames().len();
            wait_for_frames(&spy, sent_after_last_write + 4);
            assert!(handle.shutdown().is_ok());

            let frames = spy.frames();
            for f in frames.iter() {
                assert!(
                    written.contains(&f.relays),
                    "frame relay byte {:08b} was never written",
                    f.relays
                );
            }
            assert_eq!(frames.last().map(|f| f.relays), Some(expected));
        }
    }
}
