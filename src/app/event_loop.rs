use std::io::stdout;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};

const RESIZE_DELAY_MS: u64 = 100;
const PREVIEW_DELAY_MS: u64 = 300;
const HISTORY_DELAY_MS: u64 = 500;
const PERSIST_DELAY_MS: u64 = 500;

/// Holds the latest queued value until it has been quiet for `delay_ms`.
pub(super) struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay.
    pub(super) fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let queued_at = self.pending.as_ref()?.1;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Deferred work triggered by edits.
struct Timers {
    resize: Debouncer<(u16, u16)>,
    preview: Debouncer<()>,
    history: Debouncer<()>,
    persist: Debouncer<()>,
}

impl Timers {
    const fn new() -> Self {
        Self {
            resize: Debouncer::new(RESIZE_DELAY_MS),
            preview: Debouncer::new(PREVIEW_DELAY_MS),
            history: Debouncer::new(HISTORY_DELAY_MS),
            persist: Debouncer::new(PERSIST_DELAY_MS),
        }
    }

    const fn any_pending(&self) -> bool {
        self.resize.is_pending()
            || self.preview.is_pending()
            || self.history.is_pending()
            || self.persist.is_pending()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or an I/O
    /// error occurs while reading events or drawing.
    pub fn run(&self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; zenith requires an interactive terminal")?;
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        let size = terminal.size()?;

        let mut model = self.init_model((size.width, size.height));
        tracing::info!(
            width = size.width,
            height = size.height,
            "editor started"
        );

        let result = self.event_loop(&mut terminal, &mut model);

        self.persist_editor(&model);
        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (tx, rx): (Sender<Message>, Receiver<Message>) = mpsc::channel();
        let mut timers = Timers::new();
        let mut needs_render = true;

        for msg in self.startup_messages(model) {
            self.dispatch(model, msg, &tx, &mut timers, elapsed_ms());
        }

        loop {
            let now = Instant::now();
            if model.expire_toast(now) {
                needs_render = true;
            }
            model.scroll_sync.expire(now);

            let now_ms = elapsed_ms();
            if let Some((width, height)) = timers.resize.take_ready(now_ms) {
                tracing::debug!(width, height, "applying resize");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }
            if timers.preview.take_ready(now_ms).is_some() {
                *model = update(std::mem::take(model), Message::RefreshPreview);
                needs_render = true;
            }
            if timers.history.take_ready(now_ms).is_some() {
                *model = update(std::mem::take(model), Message::CommitHistory);
                needs_render = true;
            }
            if timers.persist.take_ready(now_ms).is_some() {
                self.persist_editor(model);
            }

            // Results from worker threads
            while let Ok(msg) = rx.try_recv() {
                self.dispatch(model, msg, &tx, &mut timers, elapsed_ms());
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if timers.resize.is_pending() {
                10
            } else if timers.any_pending() || model.busy.is_some() {
                50
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = elapsed_ms();
                if let Some(msg) =
                    self.handle_event(&event::read()?, model, event_ms, &mut timers.resize)
                {
                    self.dispatch(model, msg, &tx, &mut timers, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms();
                    if let Some(msg) =
                        self.handle_event(&event::read()?, model, drain_ms, &mut timers.resize)
                    {
                        drained += 1;
                        self.dispatch(model, msg, &tx, &mut timers, drain_ms);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    tracing::trace!(drained, "coalesced events");
                }
            }

            if needs_render {
                terminal.draw(|frame| self.view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Apply one message: update, side effects, then schedule the
    /// deferred preview render, history commit and persistence it implies.
    fn dispatch(
        &self,
        model: &mut Model,
        msg: Message,
        tx: &Sender<Message>,
        timers: &mut Timers,
        now_ms: u64,
    ) {
        let revision = model.editor.buffer().revision();
        let persist_key = model.persist_key();

        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, &side_msg, tx);

        if model.editor.buffer().revision() != revision {
            if model.preview_is_stale() {
                timers.preview.queue((), now_ms);
            }
            if model.editor.has_uncommitted_changes() {
                timers.history.queue((), now_ms);
            }
        }
        if model.persist_key() != persist_key {
            timers.persist.queue((), now_ms);
        }
    }
}
