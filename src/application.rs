//! Terminal lifecycle and the real-time control loop.
//!
//! The loop here is the sole owner of the [`Session`]: player input
//! arrives as messages from the reader thread, gravity fires when the
//! fall deadline elapses, and both renderers are fed after every state
//! change. Quitting and restarting are observed within one wait interval.

use std::{
    io::{self, Write},
    sync::mpsc,
    time::{Duration, Instant},
};

use crossterm::{cursor, style, terminal, ExecutableCommand};

use leuchtris_engine::{compose, Phase, Ruleset, Session};

use crate::{
    input::{InputHandler, Signal},
    lighthouse::Lighthouse,
    renderer,
};

/// How a single round of play ended, as seen by the outer session loop.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
enum SessionEnd {
    Quit,
    Restart,
    TopOut,
}

pub struct Application<T: Write> {
    term: T,
    seed: Option<u64>,
}

impl<T: Write> Drop for Application<T> {
    fn drop(&mut self) {
        // (Try to) undo terminal setup.
        let _ = terminal::disable_raw_mode();
        let _ = self.term.execute(style::ResetColor);
        let _ = self.term.execute(cursor::Show);
        let _ = self.term.execute(terminal::LeaveAlternateScreen);
    }
}

impl<T: Write> Application<T> {
    /// How often the loop wakes to look at input while gravity is paused.
    const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);
    /// Upper bound on one wait, so both renderers keep animating (and the
    /// rainbow border keeps cycling) even while gravity is slow.
    const FRAME_INTERVAL: Duration = Duration::from_millis(200);

    pub fn new(mut term: T, seed: Option<u64>) -> Self {
        // Console prologue: Initialization.
        // FIXME: Handle io::Error? If not, why not?
        let _v = term.execute(terminal::EnterAlternateScreen);
        let _v = term.execute(terminal::SetTitle("Leuchtris"));
        let _v = term.execute(cursor::Hide);
        let _v = terminal::enable_raw_mode();
        Self { term, seed }
    }

    pub fn run(&mut self) -> io::Result<()> {
        // Prepare channel from which to receive terminal inputs, and the
        // thread that feeds it. The handler outlives individual sessions.
        let (signal_sender, signal_receiver) = mpsc::channel();
        let _input_handler = InputHandler::spawn(signal_sender);

        // The remote display runs start-before-loop, stop-after-loop.
        let lighthouse = Lighthouse::from_env();

        renderer::draw_instructions(&mut self.term)?;
        if signal_receiver.recv().is_err() {
            return Ok(());
        }

        let ruleset = Ruleset::default();

        'session: loop {
            let mut session = Session::new(ruleset.clone(), self.seed);
            let mut frame_counter: u32 = 0;
            let mut next_fall = Instant::now() + session.fall_interval();

            // Show the fresh board before the first input or tick.
            self.render(&session, &lighthouse, &mut frame_counter)?;

            let outcome = 'game: loop {
                // Wait for input, but never past the gravity deadline or
                // the render cadence. While paused there is no deadline,
                // only a short poll.
                let wait_budget = if *session.phase() == Phase::Paused {
                    Self::PAUSE_POLL_INTERVAL
                } else {
                    next_fall
                        .saturating_duration_since(Instant::now())
                        .min(Self::FRAME_INTERVAL)
                };

                match signal_receiver.recv_timeout(wait_budget) {
                    Ok(Signal::Game(command)) => {
                        let was_paused = *session.phase() == Phase::Paused;
                        session.handle(command);
                        // Resuming re-arms gravity; a pause must not be
                        // followed by an instant stale fall.
                        if was_paused && *session.phase() == Phase::Running {
                            next_fall = Instant::now() + session.fall_interval();
                        }
                    }
                    Ok(Signal::Quit) => {
                        session.stop();
                        break 'game SessionEnd::Quit;
                    }
                    Ok(Signal::Restart) => {
                        session.stop();
                        break 'game SessionEnd::Restart;
                    }
                    Ok(Signal::AnyKey) => {}
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        // A timeout is a render wake-up until the actual
                        // gravity deadline has passed.
                        if *session.phase() != Phase::Paused && Instant::now() >= next_fall {
                            session.tick();
                            // Re-armed from the current level, so a
                            // level-up speeds up the *next* fall.
                            next_fall = Instant::now() + session.fall_interval();
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // Input thread died; nothing sensible left to do.
                        break 'game SessionEnd::Quit;
                    }
                }

                self.render(&session, &lighthouse, &mut frame_counter)?;

                if *session.phase() == Phase::GameOver {
                    break 'game SessionEnd::TopOut;
                }
            };

            match outcome {
                SessionEnd::Quit => break 'session,
                SessionEnd::Restart => continue 'session,
                SessionEnd::TopOut => {
                    renderer::draw_game_over(
                        &mut self.term,
                        session.field().score(),
                        session.field().level(),
                    )?;
                    loop {
                        match signal_receiver.recv() {
                            Ok(Signal::Restart) => continue 'session,
                            Ok(Signal::Quit) | Err(_) => break 'session,
                            Ok(_) => {}
                        }
                    }
                }
            }
        }

        if let Some(sink) = lighthouse {
            sink.stop();
        }

        Ok(())
    }

    /// Feeds both renderers from the current state.
    fn render(
        &mut self,
        session: &Session,
        lighthouse: &Option<Lighthouse>,
        frame_counter: &mut u32,
    ) -> io::Result<()> {
        renderer::draw_game(&mut self.term, session)?;
        if let Some(sink) = lighthouse {
            sink.set_image(compose(
                session.field(),
                session.active_piece(),
                session.next_piece(),
                *frame_counter,
            ));
        }
        *frame_counter = frame_counter.wrapping_add(1);
        Ok(())
    }
}
