//! ``src/controller/engine.rs``
//! ============================================================================
//! # Engine: Command Application and Async Fold-In
//!
//! Owns the [`Session`] and applies every [`Command`] as one atomic
//! transition. Synchronous transitions mutate the session directly.
//! Asynchronous transitions (listings, paste, trash, open, pick reporting)
//! update state twice: `apply` enters the loading condition and spawns a task
//! against the file-system service; the task reports back as a [`TaskResult`]
//! over an unbounded channel, and [`absorb`](Engine::absorb) folds the
//! response into the session.
//!
//! Listing responses carry the tab id and the epoch reserved when the request
//! was issued; a response that no longer matches the tab's current epoch is
//! dropped, so rapid navigation settles on the last request instead of racing
//! on arrival order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clipstage::StageOp;
use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::controller::commands::Command;
use crate::controller::key_decoder::{Decoded, KeyDecoder};
use crate::error::AppError;
use crate::fs::entry_info::EntryInfo;
use crate::fs::service::FileSystemService;
use crate::model::session::{PickerMode, Session};

/// Where the cursor lands when a listing response replaces the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPlacement {
    /// Entering a directory: cursor to 0, selection and mode reset.
    Reset,

    /// Refreshing in place (hidden toggle): clamp cursor, keep position.
    Clamp,
}

/// Which side-effecting operation a `Mutation` result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Paste { was_cut: bool },
    Trash,
    Open,
}

/// A completed asynchronous transition, ready to be folded into the session.
#[derive(Debug)]
pub enum TaskResult {
    Listing {
        tab: Uuid,
        epoch: u64,
        path: Arc<PathBuf>,
        placement: CursorPlacement,
        outcome: Result<Vec<EntryInfo>, AppError>,
    },

    Mutation {
        tab: Uuid,
        kind: MutationKind,
        outcome: Result<(), AppError>,
    },

    Picked {
        outcome: Result<(), AppError>,
    },
}

pub struct Engine {
    session: Session,
    decoder: KeyDecoder,
    service: Arc<dyn FileSystemService>,
    task_tx: UnboundedSender<TaskResult>,
}

impl Engine {
    pub fn new(
        session: Session,
        service: Arc<dyn FileSystemService>,
        task_tx: UnboundedSender<TaskResult>,
    ) -> Self {
        Self {
            session,
            decoder: KeyDecoder::new(),
            service,
            task_tx,
        }
    }

    /// The full session snapshot; valid after every transition.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn dismiss_error(&mut self) {
        self.session.dismiss_error();
    }

    /// Feed one raw key event through the decoder; a resolved command is
    /// applied immediately. The returned value tells the caller whether the
    /// event was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Decoded {
        let decoded = self.decoder.decode(key, now);
        if let Decoded::Command(command) = decoded {
            self.apply(command);
        }
        decoded
    }

    /// Deadline of the pending chord prefix, for callers that arm a timer.
    #[must_use]
    pub const fn chord_deadline(&self) -> Option<Instant> {
        self.decoder.deadline()
    }

    /// Discard the pending chord prefix once its deadline has passed.
    pub fn expire_chord(&mut self, now: Instant) {
        self.decoder.expire(now);
    }

    /// Kick off the initial listing for the active tab's directory.
    pub fn navigate(&mut self, path: PathBuf) {
        let tab = self.session.active_tab().id;
        self.request_listing(tab, Arc::new(path), CursorPlacement::Reset);
    }

    /// Apply one command as an atomic transition.
    pub fn apply(&mut self, command: Command) {
        debug!(?command, "Applying command");

        match command {
            Command::MoveCursor(delta) => self.session.active_tab_mut().move_cursor(delta),
            Command::JumpTop => self.session.active_tab_mut().jump_top(),
            Command::JumpBottom => self.session.active_tab_mut().jump_bottom(),
            Command::ToggleSelect => self.session.active_tab_mut().toggle_select(),
            Command::EnterVisual { line } => self.session.active_tab_mut().enter_visual(line),
            Command::CancelSelection => self.session.active_tab_mut().cancel_selection(),
            Command::SelectAll => self.session.active_tab_mut().select_all(),

            Command::Yank => self.session.stage_from_selection(StageOp::Copy),
            Command::Cut => self.session.stage_from_selection(StageOp::Move),

            Command::NewTab => self.session.new_tab(),
            Command::CloseTab => self.session.close_tab(),
            Command::SwitchTab(index) => self.session.switch_tab(index),

            Command::GoParent => self.go_parent(),
            Command::GoHome => self.go_home(),
            Command::ToggleHidden => self.toggle_hidden(),
            Command::EnterOrOpen => self.enter_or_open(),
            Command::Activate => self.activate(),
            Command::Paste => self.paste(),
            Command::Delete => self.delete(),

            Command::Quit => self.session.finish(),
        }
    }

    /// Fold a completed asynchronous transition into the session.
    pub fn absorb(&mut self, result: TaskResult) {
        match result {
            TaskResult::Listing {
                tab,
                epoch,
                path,
                placement,
                outcome,
            } => self.absorb_listing(tab, epoch, path, placement, outcome),

            TaskResult::Mutation { tab, kind, outcome } => {
                self.session.loading = false;

                match outcome {
                    Ok(()) => match kind {
                        MutationKind::Paste { was_cut } => {
                            if was_cut {
                                self.session.stage.commit_paste();
                            }
                            self.refresh_tab(tab);
                        }
                        MutationKind::Trash => self.refresh_tab(tab),
                        MutationKind::Open => {}
                    },
                    Err(error) => {
                        warn!(%error, ?kind, "File operation failed");
                        self.session.set_error(error.to_string());
                    }
                }
            }

            TaskResult::Picked { outcome } => {
                self.session.loading = false;

                match outcome {
                    Ok(()) => self.session.finish(),
                    Err(error) => self.session.set_error(error.to_string()),
                }
            }
        }
    }

    fn absorb_listing(
        &mut self,
        tab_id: Uuid,
        epoch: u64,
        path: Arc<PathBuf>,
        placement: CursorPlacement,
        outcome: Result<Vec<EntryInfo>, AppError>,
    ) {
        let Some(tab) = self.session.tab_mut(tab_id) else {
            debug!(%tab_id, "Listing response for a closed tab dropped");
            return;
        };

        if !tab.accepts_epoch(epoch) {
            debug!(%tab_id, epoch, current = tab.epoch(), "Stale listing dropped");
            return;
        }

        match outcome {
            Ok(entries) => {
                info!(path = %path.display(), count = entries.len(), "Listing applied");
                match placement {
                    CursorPlacement::Reset => tab.set_listing(path, entries),
                    CursorPlacement::Clamp => tab.refresh_entries(entries),
                }
                self.session.loading = false;
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "Listing failed");
                self.session.loading = false;
                self.session.set_error(error.to_string());
            }
        }
    }

    // ------------------------------------------------------------------
    // Asynchronous transitions
    // ------------------------------------------------------------------

    fn go_parent(&mut self) {
        let tab = self.session.active_tab();
        let Some(parent) = self.service.parent(&tab.cwd) else {
            return;
        };

        let tab_id = tab.id;
        self.request_listing(tab_id, Arc::new(parent), CursorPlacement::Reset);
    }

    fn go_home(&mut self) {
        let home = self.service.home();
        let tab_id = self.session.active_tab().id;
        self.request_listing(tab_id, Arc::new(home), CursorPlacement::Reset);
    }

    fn toggle_hidden(&mut self) {
        self.session.show_hidden = !self.session.show_hidden;

        let tab = self.session.active_tab();
        let (tab_id, cwd) = (tab.id, Arc::clone(&tab.cwd));
        self.request_listing(tab_id, cwd, CursorPlacement::Clamp);
    }

    fn enter_or_open(&mut self) {
        let tab = self.session.active_tab();
        let Some(entry) = tab.current_entry() else {
            return;
        };

        let path = Arc::clone(&entry.path);
        if entry.is_dir {
            let tab_id = tab.id;
            self.request_listing(tab_id, path, CursorPlacement::Reset);
        } else if self.session.picker == PickerMode::File {
            self.report_pick(path);
        } else {
            self.open(path);
        }
    }

    fn activate(&mut self) {
        let tab = self.session.active_tab();
        let Some(entry) = tab.current_entry() else {
            return;
        };

        let path = Arc::clone(&entry.path);
        match (self.session.picker, entry.is_dir) {
            (PickerMode::File, false) | (PickerMode::Dir, true) => self.report_pick(path),
            (PickerMode::None, _) => self.open(path),
            // Non-qualifying entry in a picker session: nothing fires.
            _ => {}
        }
    }

    fn paste(&mut self) {
        let Some(staged) = self.session.stage.staged() else {
            return;
        };

        let sources: Vec<Arc<PathBuf>> = staged.paths.to_vec();
        let was_cut = staged.op == StageOp::Move;

        let tab = self.session.active_tab();
        let (tab_id, dest) = (tab.id, Arc::clone(&tab.cwd));

        info!(count = sources.len(), cut = was_cut, dest = %dest.display(), "Paste requested");
        self.begin_request();

        let service = Arc::clone(&self.service);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let outcome = if was_cut {
                service.rename(&sources, &dest).await
            } else {
                service.copy(&sources, &dest).await
            };

            let _ = tx.send(TaskResult::Mutation {
                tab: tab_id,
                kind: MutationKind::Paste { was_cut },
                outcome,
            });
        });
    }

    fn delete(&mut self) {
        let tab = self.session.active_tab();
        let targets = tab.selection_or_current();
        if targets.is_empty() {
            return;
        }

        let tab_id = tab.id;
        info!(count = targets.len(), "Trash requested");
        self.begin_request();

        let service = Arc::clone(&self.service);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let outcome = service.trash(&targets).await;
            let _ = tx.send(TaskResult::Mutation {
                tab: tab_id,
                kind: MutationKind::Trash,
                outcome,
            });
        });
    }

    fn open(&mut self, path: Arc<PathBuf>) {
        let tab_id = self.session.active_tab().id;
        self.begin_request();

        let service = Arc::clone(&self.service);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let outcome = service.open_detached(&path).await;
            let _ = tx.send(TaskResult::Mutation {
                tab: tab_id,
                kind: MutationKind::Open,
                outcome,
            });
        });
    }

    fn report_pick(&mut self, path: Arc<PathBuf>) {
        info!(path = %path.display(), "Reporting picked path");
        self.begin_request();

        let service = Arc::clone(&self.service);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let outcome = service.report_picked(&path).await;
            let _ = tx.send(TaskResult::Picked { outcome });
        });
    }

    /// Re-list a tab's current directory after a mutation landed in it.
    fn refresh_tab(&mut self, tab_id: Uuid) {
        let Some(tab) = self.session.tab_mut(tab_id) else {
            return;
        };

        let cwd = Arc::clone(&tab.cwd);
        self.request_listing(tab_id, cwd, CursorPlacement::Reset);
    }

    fn request_listing(&mut self, tab_id: Uuid, path: Arc<PathBuf>, placement: CursorPlacement) {
        let Some(tab) = self.session.tab_mut(tab_id) else {
            return;
        };
        let epoch = tab.begin_listing();

        debug!(path = %path.display(), epoch, "Listing requested");
        self.begin_request();

        let include_hidden = self.session.show_hidden;
        let service = Arc::clone(&self.service);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let outcome = service.list_directory(&path, include_hidden).await;
            let _ = tx.send(TaskResult::Listing {
                tab: tab_id,
                epoch,
                path,
                placement,
                outcome,
            });
        });
    }

    /// Shared entry into the loading condition; a fresh attempt also clears
    /// any stale error.
    fn begin_request(&mut self) {
        self.session.error = None;
        self.session.loading = true;
    }
}
