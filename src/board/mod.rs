//! The board driver API. [`Board`] owns the relay register and display buffer shared between
//! client calls and the display [`Refresher`](refresh::Refresher), and is the only way to mutate
//! either.

use crate::config::BoardConfig;
use crate::mutex::IOMutex;
use crate::segments::{Displayable, DisplayBuffer, SegmentPattern, BLANK_DISPLAY, DIGITS};

pub mod inputs;
pub mod refresh;

/// Number of relays on the board.
pub const RELAYS: u8 = 8;

/// The relay bits, first byte of every bus frame. Bit `n` drives relay `n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayRegister(u8);

impl RelayRegister {
    /// Create a register from a raw relay byte.
    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw relay byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// State of relay `index`. Indices past the last relay read as open.
    pub fn get(self, index: u8) -> bool {
        index < RELAYS && self.0 & (1 << index) != 0
    }

    /// Set relay `index` closed (`true`) or open (`false`). Returns `false`, leaving the register
    /// untouched, if there is no such relay.
    pub fn set(&mut self, index: u8, on: bool) -> bool {
        if index >= RELAYS {
            return false;
        }
        if on {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
        true
    }
}

impl From<RelayRegister> for u8 {
    fn from(relays: RelayRegister) -> u8 {
        relays.0
    }
}

/// Everything the refresh loop reads and client calls write. Lives inside the board's
/// [`IOMutex`]; nothing outside a critical section ever sees a half-updated copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardState {
    pub relays: RelayRegister,
    pub display: DisplayBuffer,
}

impl BoardState {
    fn reset(config: &BoardConfig) -> Self {
        Self {
            relays: RelayRegister::new(config.reset_relays()),
            display: BLANK_DISPLAY,
        }
    }
}

/// The ES32A08 board: relay register and display contents, guarded by `M`.
///
/// Client calls take the lock only long enough to copy a value in or out; bus traffic happens in
/// the [`Refresher`](refresh::Refresher), which re-latches the relays with every digit it draws.
/// Changes therefore reach the hardware within one dwell time.
pub struct Board<M: IOMutex<BoardState>> {
    state: M,
    config: BoardConfig,
}

impl<M: IOMutex<BoardState>> Board<M> {
    /// Create a new `Board` in its reset state: relays as configured, display blank.
    pub fn new(config: BoardConfig) -> Self {
        Self {
            state: M::new(BoardState::reset(&config)),
            config,
        }
    }

    /// The settings this board was created with.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Show `value` on the display: text (first four characters), an `i32` right-justified, or
    /// an `f32`/`f64` with as many decimals as fit. Numbers that do not fit show `" -- "`. See
    /// [`segments`](crate::segments) for the exact rules.
    pub fn display<T: Displayable>(&self, value: T) {
        let segments = value.to_segments();
        self.state.lock(|s| s.display = segments);
    }

    /// Blank the display. Relays are untouched.
    pub fn clear_display(&self) {
        self.state.lock(|s| s.display = BLANK_DISPLAY);
    }

    /// A copy of what the display is currently showing.
    pub fn display_buffer(&self) -> DisplayBuffer {
        self.state.lock(|s| s.display)
    }

    /// Close (`true`) or open (`false`) relay `index`, 0 to 7. Other indices are ignored.
    pub fn set_relay(&self, index: u8, on: bool) {
        if !self.state.lock(|s| s.relays.set(index, on)) {
            log::warn!("ignoring write to relay {}: board has {}", index, RELAYS);
        }
    }

    /// Replace all eight relay states at once; bit `n` is relay `n`.
    pub fn set_relays(&self, mask: u8) {
        self.state.lock(|s| s.relays = RelayRegister::new(mask));
    }

    /// All eight relay states as one byte; bit `n` is relay `n`.
    pub fn relays(&self) -> u8 {
        self.state.lock(|s| s.relays.bits())
    }

    /// Whether relay `index` is closed. Out-of-range indices read `false`.
    pub fn relay(&self, index: u8) -> bool {
        self.state.lock(|s| s.relays.get(index))
    }

    /// Return relays to their configured reset state and blank the display.
    pub fn reset(&self) {
        let fresh = BoardState::reset(&self.config);
        self.state.lock(|s| *s = fresh);
        log::debug!("board reset, relays {:#010b}", fresh.relays.bits());
    }

    /// Copy out the relay byte and the pattern for one digit position in a single critical
    /// section.
    pub(crate) fn snapshot(&self, position: usize) -> (u8, SegmentPattern) {
        self.state.lock(|s| {
            let pattern = s.display.get(position).copied().unwrap_or_default();
            (s.relays.bits(), pattern)
        })
    }
}

impl<M: IOMutex<BoardState>> Default for Board<M> {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
