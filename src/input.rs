//! Input-reader thread: translates terminal key events into [`Signal`]s
//! sent over a channel. The receiving control loop is the only owner of
//! game state; this thread never touches it.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use leuchtris_engine::Command;

/// What the input thread tells the control loop.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Signal {
    /// A gameplay intent for the session.
    Game(Command),
    /// Quit the program.
    Quit,
    /// Tear the current session down and start a fresh one.
    Restart,
    /// Some other key; used to dismiss the instructions screen.
    AnyKey,
}

/// Handle to the spawned reader thread. Dropping it stops the thread
/// within one poll interval.
#[derive(Debug)]
pub struct InputHandler {
    handles: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl Drop for InputHandler {
    fn drop(&mut self) {
        if let Some((flag, _)) = self.handles.take() {
            flag.store(false, Ordering::Release);
        }
    }
}

impl InputHandler {
    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    pub fn spawn(signal_sender: Sender<Signal>) -> Self {
        let flag = Arc::new(AtomicBool::new(true));
        let join_handle = Self::spawn_reader(flag.clone(), signal_sender);
        InputHandler {
            handles: Some((flag, join_handle)),
        }
    }

    fn spawn_reader(flag: Arc<AtomicBool>, signal_sender: Sender<Signal>) -> JoinHandle<()> {
        thread::spawn(move || {
            'react_to_event: loop {
                // Maybe stop thread.
                let running = flag.load(Ordering::Acquire);
                if !running {
                    break 'react_to_event;
                };
                match event::poll(Self::POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) | Err(_) => continue 'react_to_event,
                }
                match event::read() {
                    Ok(Event::Key(KeyEvent {
                        code: KeyCode::Char('c'),
                        modifiers: KeyModifiers::CONTROL,
                        ..
                    })) => {
                        let _ = signal_sender.send(Signal::Quit);
                        break 'react_to_event;
                    }
                    // Candidate key pressed.
                    Ok(Event::Key(KeyEvent {
                        code: key,
                        kind: KeyEventKind::Press,
                        ..
                    })) => {
                        let signal = match key {
                            KeyCode::Left => Signal::Game(Command::MoveLeft),
                            KeyCode::Right => Signal::Game(Command::MoveRight),
                            KeyCode::Down => Signal::Game(Command::SoftDrop),
                            KeyCode::Up => Signal::Game(Command::Rotate),
                            KeyCode::Char('p' | 'P') => Signal::Game(Command::TogglePause),
                            KeyCode::Char('q' | 'Q') => Signal::Quit,
                            KeyCode::Char('r' | 'R') => Signal::Restart,
                            _ => Signal::AnyKey,
                        };
                        if signal_sender.send(signal).is_err() {
                            // Receiver gone; nothing left to do here.
                            break 'react_to_event;
                        }
                    }
                    // Don't care about other events: ignore.
                    _ => {}
                };
            }
        })
    }
}
