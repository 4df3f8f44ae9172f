//! Driver library for the ES32A08 relay and display I/O board.
//!
//! The ES32A08 carries eight relays, a four-digit seven-segment display, eight opto-isolated
//! digital inputs, four push buttons and eight analog inputs. The relays and the display hang off
//! one chain of three 74HC595 shift registers, so every latched frame carries the relay byte, the
//! digit select byte and the segment byte together. The digital inputs sit behind a 74HC165.
//!
//! This driver is intended to work on embedded platforms using any implementation of the
//! `embedded-hal` 1.0 traits. It bit-bangs both shift chains through plain GPIO pins and a delay
//! provider.
//!
//! # Construction
//!
//! To set up the driver:
//!
//! - Use your platform's `embedded-hal` implementation to obtain the data, clock and latch output
//!   pins wired to the 74HC595 chain, plus something implementing `DelayNs`.
//! - Construct an [`OutputBus`], the [`ShiftOutBus`] for the ES32A08, which takes ownership of
//!   those pins.
//! - Construct a [`Board`], which holds the relay and display state, and a [`Refresher`] that
//!   draws that state onto the bus.
//!
//! ```ignore
//! let data = /* construct something implementing embedded_hal::digital::OutputPin */
//! let clock = /* ... */
//! let latch = /* ... */
//! let delay = /* construct something implementing embedded_hal::delay::DelayNs */
//!
//! let config = es32a08::BoardConfig::default();
//! let bus = es32a08::ShiftOutBus::new(data, clock, latch, delay, config.digit_dwell());
//! let board = es32a08::Board::<es32a08::DefaultMutex<_>>::new(config);
//! ```
//!
//! # Relays and display
//!
//! *See [`Board`].*
//!
//! Client calls only ever touch the board's shared state, and take `&self`:
//!
//! ```
//! # use es32a08::{Board, BoardState, DefaultMutex};
//! let board: Board<DefaultMutex<BoardState>> = Board::default();
//! board.set_relay(0, true);
//! board.set_relay(3, true);
//! assert_eq!(board.relays(), 0b0000_1001);
//!
//! board.display("StOP");
//! board.display(-42);
//! board.display(3.14);
//! ```
//!
//! Text shows its first four characters; characters with no seven-segment form are blank. An
//! `i32` is right-justified. A float gets as many decimals as fit in four digits. Numbers that do
//! not fit at all show `" -- "`. See [`segments`] for the exact rules.
//!
//! # Refresh
//!
//! *See [`Refresher`].*
//!
//! Only one digit is lit per latched frame, so something has to keep cycling through the four
//! digits. That is also what carries relay changes to the hardware: a new relay state is latched
//! with the next digit drawn.
//!
//! On a platform with a scheduler of its own, drive the refresher from a timer or task:
//!
//! ```
//! # use es32a08::{Board, BoardState, DefaultMutex, Refresher};
//! # let bus = es32a08::interface::noop::NoopBus;
//! let board: Board<DefaultMutex<BoardState>> = Board::default();
//! let mut refresher = Refresher::new(&board, bus);
//!
//! board.display(1234);
//! refresher.tick()?; // draws digit 0
//! refresher.cycle()?; // draws digits 1, 2, 3 and 0 again
//! # Ok::<(), core::convert::Infallible>(())
//! ```
//!
//! With the `std` feature the refresher can run on its own thread instead:
//!
//! ```
//! # use std::sync::Arc;
//! # use es32a08::{Board, BoardState, DefaultMutex};
//! # let bus = es32a08::interface::noop::NoopBus;
//! let board = Arc::new(Board::<DefaultMutex<BoardState>>::default());
//! let refresh = board.start_refresh(bus)?;
//!
//! board.display("run");
//! board.set_relay(7, true);
//!
//! let bus = refresh.shutdown().expect("refresh thread panicked");
//! # let _ = bus;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Shutting down latches one last frame with the display dark and the relays as they were, and
//! hands the bus back.
//!
//! # Inputs
//!
//! *See [`DigitalInputs`], [`Buttons`] and [`analog`].*
//!
//! The inputs share nothing with the display chain, so they are owned wrappers that read on
//! demand:
//!
//! ```ignore
//! let bus = es32a08::ShiftInBus::new(load, clock, data, delay, config.input_delay());
//! let mut inputs = es32a08::DigitalInputs::new(bus);
//! if inputs.read(1)? {
//!     board.set_relay(0, true);
//! }
//! ```
//!
//! ## Mutual exclusion
//!
//! The board state is shared between client calls and the refresh, and is guarded by a type
//! implementing the `IOMutex` trait, a concept borrowed from [`shared-bus`](http://docs.rs/shared-bus).
//!
//! In a `std` environment you may enable the `std` Cargo feature, and `mutex::DefaultMutex<T>`
//! will be a type alias to `std::sync::Mutex<T>` with a provided impl of `IOMutex`. Similarly, for
//! Cortex-M environments using the `cortex-m` crate, enabling the `cortexm` Cargo feature (without
//! `std`) will alias `mutex::DefaultMutex<T>` to `cortex_m::interrupt::Mutex<core::cell::RefCell<T>>`
//! with a provided `IOMutex` impl.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod analog;
pub mod board;
pub mod config;
pub mod frame;
pub mod interface;
pub mod mutex;
pub mod segments;

pub use analog::{AdcReader, AnalogInput, AnalogInputs};
pub use board::inputs::{Buttons, DigitalInputs, PowerLed};
#[cfg(feature = "std")]
pub use board::refresh::RefreshHandle;
pub use board::refresh::Refresher;
pub use board::{Board, BoardState, RelayRegister};
pub use config::BoardConfig;
pub use frame::{BusFrame, DigitSelect, DigitSelectMask};
pub use interface::shift_in::ShiftInBus;
pub use interface::shift_out::ShiftOutBus;
pub use interface::{InputBus, OutputBus};
#[cfg(any(feature = "std", feature = "cortexm"))]
pub use mutex::DefaultMutex;
pub use mutex::IOMutex;
pub use segments::{DisplayBuffer, Displayable, SegmentPattern};
