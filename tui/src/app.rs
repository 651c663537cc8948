//! Main Application
//!
//! The App struct manages the TUI lifecycle around an embedded session
//! manager:
//! - Event loop (keyboard, mouse, resize)
//! - SessionManager for the conversation
//! - DisplayState for per-message reveal progress
//! - ModalAnimator for the slide-in chat panel
//!
//! # Request Flow
//!
//! The render loop owns the session manager. Questions are started with
//! `begin_send`, the HTTP call runs on a spawned task, and the result comes
//! back over an mpsc channel to be applied with `complete_send`. The loop
//! keeps drawing (typing indicator included) while a request is in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};
use ratatui::Terminal;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthChar;

use chat_widget_core::{
    AskBackend, AskRequest, AskResponse, BackendError, ModalAnimator, ModalState,
    SessionManager, SessionStore,
};

use crate::compositor::{Compositor, LayerId};
use crate::display::{DisplayMessage, DisplayRole, DisplayState};
use crate::theme::{
    accent_style, follow_up_style, ASSISTANT_BLUE, DIM_GRAY, ERROR_RED, USER_GREEN,
};

/// Target ~20 FPS so the typewriter reads smoothly
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Largest modal size
const MODAL_MAX_WIDTH: u16 = 64;
const MODAL_MAX_HEIGHT: u16 = 22;

/// Launcher shown while the modal is closed
const LAUNCHER_LABEL: &str = " Chat [Ctrl+O] ";

type Reply = Result<AskResponse, BackendError>;

/// One wrapped line of the message list
#[derive(Clone, Debug)]
struct ListLine {
    text: String,
    style: Style,
    /// Follow-up question this line belongs to, if clickable
    follow_up: Option<String>,
}

/// Main application state
pub struct App<B: AskBackend + 'static, S: SessionStore> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conversation ===
    /// The embedded session manager
    session: SessionManager<B, S>,
    /// Reveal progress per message
    display: DisplayState,
    /// Replies from spawned requests
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies_rx: mpsc::UnboundedReceiver<Reply>,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
    /// Layer assignments
    layers: AppLayers,
    /// Modal open/close animation
    modal: ModalAnimator,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Modal-local rows holding a clickable follow-up
    follow_up_rows: Vec<(u16, String)>,

    // === Misc State ===
    /// Last frame time (for animations)
    last_frame: Instant,
    /// Terminal size
    size: (u16, u16),
}

/// Layer IDs for UI regions
struct AppLayers {
    host: LayerId,
    launcher: LayerId,
    modal: LayerId,
}

impl<B: AskBackend + 'static, S: SessionStore> App<B, S> {
    /// Create a new App around an initialized session manager
    pub fn new(session: SessionManager<B, S>, size: (u16, u16)) -> Self {
        let (width, height) = size;
        let area = Rect::new(0, 0, width, height);

        let mut compositor = Compositor::new(area);
        let host = compositor.create_layer(area, 0);
        let launcher = compositor.create_layer(launcher_rect(width, height), 10);

        let modal_bounds = modal_rect(width, height);
        let modal = compositor.create_layer(modal_bounds, 50);
        compositor.set_visible(modal, false);

        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let config = session.config();
        let display = DisplayState::new(config.typewriter_speed_ms);
        let animator = ModalAnimator::new(config.modal_animation);

        Self {
            running: true,
            session,
            display,
            replies_tx,
            replies_rx,
            compositor,
            layers: AppLayers {
                host,
                launcher,
                modal,
            },
            modal: animator,
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            follow_up_rows: Vec::new(),
            last_frame: Instant::now(),
            size,
        }
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.update(Instant::now());
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                // Frame tick
                () = tokio::time::sleep(FRAME_DURATION) => {}
            }

            self.process_replies();
            self.update(Instant::now());
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        Ok(())
    }

    /// Whether the app is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The embedded session manager
    pub fn session(&self) -> &SessionManager<B, S> {
        &self.session
    }

    /// Dispatch a terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => {}
        }
    }

    /// Apply every reply that has arrived
    fn process_replies(&mut self) {
        while let Ok(reply) = self.replies_rx.try_recv() {
            self.apply_reply(reply);
        }
    }

    fn apply_reply(&mut self, reply: Reply) {
        if self.session.complete_send(reply).is_some() {
            self.scroll_offset = 0;
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let now = Instant::now();

        match key.code {
            // Quit
            KeyCode::Char('c') if ctrl => self.running = false,

            KeyCode::Char('o') if ctrl => self.toggle_modal(now),

            KeyCode::Esc => {
                if self.modal.is_visible() {
                    self.modal.close(now);
                } else {
                    self.running = false;
                }
            }

            // Everything below only applies inside the modal
            _ if !self.accepts_input() => {}

            KeyCode::Char('l') if ctrl => {
                self.session.clear();
                self.display.sync(self.session.messages());
                self.scroll_offset = 0;
            }
            KeyCode::Char('d') if ctrl => self.session.dismiss_error(),

            KeyCode::Tab => {
                if let Some(follow_up) = self.display.latest_follow_up(self.session.messages()) {
                    self.accept_follow_up(&follow_up);
                }
            }

            // Submit question
            KeyCode::Enter => self.submit(),

            // Typing
            KeyCode::Char(c) if !ctrl => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page_size = usize::from(self.modal_bounds().height / 2);
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page_size).min(max_scroll);
            }
            KeyCode::PageDown => {
                let page_size = usize::from(self.modal_bounds().height / 2);
                self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
            }

            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.accepts_input() {
            if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                && self.compositor.layer_at(mouse.column, mouse.row) == Some(self.layers.launcher)
            {
                self.open_modal(Instant::now());
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => {
                if self.scroll_offset < self.total_lines.saturating_sub(1) {
                    self.scroll_offset += 3;
                }
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(3);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.compositor.layer_at(mouse.column, mouse.row) != Some(self.layers.modal) {
                    return;
                }
                let clicked = self
                    .compositor
                    .to_layer_local(self.layers.modal, mouse.column, mouse.row)
                    .and_then(|(_, row)| {
                        self.follow_up_rows
                            .iter()
                            .find(|(r, _)| *r == row)
                            .map(|(_, text)| text.clone())
                    });
                if let Some(follow_up) = clicked {
                    self.accept_follow_up(&follow_up);
                }
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let area = Rect::new(0, 0, width, height);

        self.compositor.resize(area);
        self.compositor.resize_layer(self.layers.host, width, height);

        let launcher = launcher_rect(width, height);
        self.compositor
            .move_layer(self.layers.launcher, launcher.x, launcher.y);
        self.compositor
            .resize_layer(self.layers.launcher, launcher.width, launcher.height);

        // Position is recomputed from the animation every frame
        let modal = modal_rect(width, height);
        self.compositor
            .resize_layer(self.layers.modal, modal.width, modal.height);
    }

    /// Start opening the modal; the conversation counts as visible from here
    fn open_modal(&mut self, now: Instant) {
        if self.modal.open(now) {
            self.session.open();
        }
    }

    fn toggle_modal(&mut self, now: Instant) {
        match self.modal.state() {
            ModalState::Closed | ModalState::Closing { .. } => self.open_modal(now),
            ModalState::Open | ModalState::Opening { .. } => {
                self.modal.close(now);
            }
        }
    }

    /// Whether keystrokes go to the modal
    fn accepts_input(&self) -> bool {
        matches!(
            self.modal.state(),
            ModalState::Open | ModalState::Opening { .. }
        )
    }

    fn submit(&mut self) {
        if let Some(request) = self.session.begin_send(&self.input_buffer) {
            self.input_buffer.clear();
            self.scroll_offset = 0;
            self.spawn_request(request);
        }
    }

    fn accept_follow_up(&mut self, follow_up: &str) {
        tracing::debug!(follow_up, "Follow-up accepted");
        if let Some(request) = self.session.begin_follow_up() {
            self.scroll_offset = 0;
            self.spawn_request(request);
        }
    }

    /// Run a request off the render loop
    fn spawn_request(&self, request: AskRequest) {
        let backend = Arc::clone(self.session.backend());
        let replies = self.replies_tx.clone();

        tokio::spawn(async move {
            let reply = backend.ask(&request).await;
            if replies.send(reply).is_err() {
                tracing::debug!("App closed before the reply arrived");
            }
        });
    }

    /// Update animations and state
    pub fn update(&mut self, now: Instant) {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        if let Some(transition) = self.modal.update(now) {
            tracing::debug!(?transition, "Modal slide finished");
        }

        self.display.sync(self.session.messages());
        self.display.update(delta);

        // Slide the modal up from the bottom edge
        let target = modal_rect(self.size.0, self.size.1);
        let hidden = 1.0 - self.modal.progress(now);
        let offset = (f32::from(target.height) * hidden).round() as u16;
        self.compositor
            .move_layer(self.layers.modal, target.x, target.y.saturating_add(offset));

        let visible = self.modal.is_visible();
        self.compositor.set_visible(self.layers.modal, visible);
        self.compositor.set_visible(self.layers.launcher, !visible);
    }

    fn modal_bounds(&self) -> Rect {
        self.compositor
            .layer_bounds(self.layers.modal)
            .unwrap_or_default()
    }

    /// Render the UI
    fn render<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        self.render_layers();

        terminal.draw(|frame| {
            let output = self.compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    let idx = output.index_of(x, y);
                    if idx < output.content.len() {
                        buf[(x, y)] = output.content[idx].clone();
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Draw every layer and composite them
    pub fn render_to_buffer(&mut self) -> &Buffer {
        self.render_layers();
        self.compositor.composite()
    }

    fn render_layers(&mut self) {
        self.render_host();
        self.render_launcher();
        self.render_modal();
    }

    /// Render the host area behind the widget
    fn render_host(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.host) {
            buf.reset();
            let dim = Style::default().fg(DIM_GRAY);
            buf.set_string(1, 1, "chat-widget", dim.add_modifier(Modifier::BOLD));
            buf.set_string(
                1,
                2,
                "Ctrl+O opens the chat. Esc closes it, or quits when closed.",
                dim,
            );
        }
    }

    /// Render the launcher line
    fn render_launcher(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.launcher) {
            buf.reset();
            buf.set_string(0, 0, LAUNCHER_LABEL, accent_style().add_modifier(Modifier::REVERSED));
        }
    }

    /// Render the modal: title, messages, error banner, input, status
    fn render_modal(&mut self) {
        if !self.modal.is_visible() {
            self.follow_up_rows.clear();
            return;
        }

        let bounds = self.modal_bounds();
        let title = format!(" {} ", self.session.config().title);
        let block = Block::bordered().title(title).border_style(accent_style());
        let inner = block.inner(Rect::new(0, 0, bounds.width, bounds.height));
        if inner.width < 8 || inner.height < 4 {
            return;
        }

        // Bottom-up: status, input, optional error banner
        let status_y = inner.y + inner.height - 1;
        let input_y = status_y - 1;
        let error = self.session.error().map(str::to_string);
        let list_bottom = if error.is_some() { input_y - 1 } else { input_y };
        let list_height = usize::from(list_bottom - inner.y);
        let width = usize::from(inner.width);

        let view = self.display.view(self.session.messages());
        let lines = build_list_lines(
            &view,
            width,
            self.session.is_loading(),
            &self.session.config().empty_state_message,
        );

        self.total_lines = lines.len();
        let max_scroll = self.total_lines.saturating_sub(list_height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(list_height);
        let visible = &lines[visible_start..visible_end];

        self.follow_up_rows = visible
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let row = inner.y + u16::try_from(i).ok()?;
                line.follow_up.clone().map(|f| (row, f))
            })
            .collect();

        let input_line = truncate_to_width(&format!("> {}_", self.input_buffer), width);
        let status = self.status_line();

        let Some(buf) = self.compositor.layer_buffer_mut(self.layers.modal) else {
            return;
        };
        buf.reset();
        block.render(buf.area, buf);

        for (i, line) in visible.iter().enumerate() {
            let Ok(offset) = u16::try_from(i) else { break };
            buf.set_string(inner.x, inner.y + offset, &line.text, line.style);
        }

        if let Some(error) = error {
            let banner = truncate_to_width(&format!("! {error} (Ctrl+D to dismiss)"), width);
            buf.set_string(inner.x, input_y - 1, banner, Style::default().fg(ERROR_RED));
        }

        buf.set_string(inner.x, input_y, input_line, Style::default().fg(USER_GREEN));

        let (status_text, status_style) = status;
        buf.set_string(
            inner.x,
            status_y,
            truncate_to_width(&status_text, width),
            status_style,
        );
    }

    fn status_line(&self) -> (String, Style) {
        if let Some(err) = self.session.init_error() {
            let hint = if err.is_recoverable() {
                ""
            } else {
                " | set --base-url and restart"
            };
            return (format!("{err}{hint}"), Style::default().fg(ERROR_RED));
        }

        let dim = Style::default().fg(DIM_GRAY);
        let scroll_info = if self.scroll_offset > 0 {
            format!(" | ^{} lines", self.scroll_offset)
        } else {
            String::new()
        };

        if self.session.is_loading() {
            (format!("Waiting for reply... | Esc close{scroll_info}"), dim)
        } else {
            (
                format!("Enter send | Tab follow-up | Ctrl+L clear | Esc close{scroll_info}"),
                dim,
            )
        }
    }
}

/// Modal bounds when fully open: bottom-right, capped in size
fn modal_rect(width: u16, height: u16) -> Rect {
    let w = width.saturating_sub(2).min(MODAL_MAX_WIDTH);
    let h = height.saturating_sub(2).min(MODAL_MAX_HEIGHT);
    Rect::new(width.saturating_sub(w + 1), height.saturating_sub(h + 1), w, h)
}

/// Launcher bounds: bottom-right corner, one line
fn launcher_rect(width: u16, height: u16) -> Rect {
    let label = u16::try_from(LAUNCHER_LABEL.len()).unwrap_or(u16::MAX);
    let w = label.min(width);
    Rect::new(width.saturating_sub(w + 1), height.saturating_sub(1), w, 1)
}

/// Wrap and style the message list
fn build_list_lines(
    view: &[DisplayMessage],
    width: usize,
    loading: bool,
    empty_state: &str,
) -> Vec<ListLine> {
    let mut lines = Vec::new();
    let plain = |text: String, style: Style| ListLine {
        text,
        style,
        follow_up: None,
    };

    if view.is_empty() && !loading {
        for text in wrap_text(empty_state, width) {
            lines.push(plain(text, Style::default().fg(DIM_GRAY)));
        }
        return lines;
    }

    for msg in view {
        let color = match msg.role {
            DisplayRole::User => USER_GREEN,
            DisplayRole::Assistant => ASSISTANT_BLUE,
            DisplayRole::Error => ERROR_RED,
        };
        let cursor = if msg.revealing { "_" } else { "" };
        let content = format!("{}{}{}", msg.role.prefix(), msg.answer, cursor);
        for text in wrap_text(&content, width) {
            lines.push(plain(text, Style::default().fg(color)));
        }

        if let Some(follow_up) = &msg.follow_up {
            for text in wrap_text(&format!("-> {follow_up}"), width) {
                lines.push(ListLine {
                    text,
                    style: follow_up_style(),
                    follow_up: Some(follow_up.clone()),
                });
            }
        }
        lines.push(plain(String::new(), Style::default()));
    }

    if loading {
        lines.push(plain(
            "Assistant is typing...".to_string(),
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        ));
    }

    lines
}

/// Wrap text to width, keeping blank lines
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.to_string())
                    .collect()
            }
        })
        .collect()
}

/// Cut a string to at most `width` terminal columns
fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_widget_core::backend::{ApiEnvelope, AskData, SessionInfo};
    use chat_widget_core::{MemorySessionStore, MessageKind, WidgetConfig};
    use pretty_assertions::assert_eq;

    /// Backend that echoes the question and always suggests a follow-up
    struct EchoBackend;

    #[async_trait]
    impl AskBackend for EchoBackend {
        fn name(&self) -> &str {
            "Echo"
        }

        async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
            Ok(ApiEnvelope {
                status: true,
                code: "00".to_string(),
                message: "Success".to_string(),
                data: Some(AskData {
                    answer: format!("You asked: {}", request.question),
                    follow_up_question: Some("Want more?".to_string()),
                    conversation_id: Some(1),
                    session_id: Some("echo-session".to_string()),
                }),
            })
        }

        async fn session_info(
            &self,
            _session_id: &str,
        ) -> Result<ApiEnvelope<SessionInfo>, BackendError> {
            Err(BackendError::Http { status: 404 })
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    type TestApp = App<EchoBackend, MemorySessionStore>;

    fn app_with(config: WidgetConfig) -> TestApp {
        let mut session =
            SessionManager::new(config, Arc::new(EchoBackend), MemorySessionStore::new());
        session.initialize();
        App::new(session, (80, 24))
    }

    fn app() -> TestApp {
        let mut config = WidgetConfig::with_base_url("http://localhost:8000")
            .welcome("Hello!")
            .typewriter_speed(10);
        config.modal_animation = Duration::from_millis(100);
        app_with(config)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
    }

    /// Open the modal and let the slide finish
    fn open(app: &mut TestApp) {
        app.handle_event(ctrl('o'));
        app.update(Instant::now() + Duration::from_millis(150));
    }

    /// Let every running reveal finish
    fn settle(app: &mut TestApp) {
        let later = app.last_frame + Duration::from_secs(10);
        app.update(later);
    }

    async fn receive_reply(app: &mut TestApp) {
        let reply = app.replies_rx.recv().await.unwrap();
        app.apply_reply(reply);
    }

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_launcher_visible_while_closed() {
        let mut app = app();
        app.update(Instant::now());
        let text = screen_text(app.render_to_buffer());
        assert!(text.contains("Chat [Ctrl+O]"));
        assert!(!text.contains("Hello!"));
    }

    #[tokio::test]
    async fn test_open_seeds_welcome() {
        let mut app = app();
        open(&mut app);

        assert_eq!(app.modal.state(), ModalState::Open);
        assert_eq!(app.session().messages().len(), 1);
        assert_eq!(
            app.session().messages()[0].kind(),
            Some(MessageKind::Welcome)
        );

        settle(&mut app);
        let text = screen_text(app.render_to_buffer());
        assert!(text.contains("Assistant: Hello!"));
        assert!(!text.contains("Chat [Ctrl+O]"));
    }

    #[tokio::test]
    async fn test_question_during_slide_follows_welcome() {
        let mut app = app();
        app.handle_event(ctrl('o'));
        assert!(matches!(app.modal.state(), ModalState::Opening { .. }));

        type_text(&mut app, "Quick one");
        app.handle_event(key(KeyCode::Enter));

        let messages = app.session().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind(), Some(MessageKind::Welcome));
        assert_eq!(messages[1].content, "Quick one");
    }

    #[tokio::test]
    async fn test_launcher_click_opens_modal() {
        let mut app = app();
        app.update(Instant::now());
        let launcher = app.compositor.layer_bounds(app.layers.launcher).unwrap();
        app.handle_event(click(launcher.x + 1, launcher.y));

        assert!(app.modal.is_visible());
        assert_eq!(app.session().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_state_without_welcome() {
        let mut app = app_with(WidgetConfig::with_base_url("http://localhost:8000"));
        open(&mut app);
        let text = screen_text(app.render_to_buffer());
        assert!(text.contains("Ask me anything to get started."));
    }

    #[tokio::test]
    async fn test_typing_ignored_while_closed() {
        let mut app = app();
        type_text(&mut app, "hi");
        assert_eq!(app.input_buffer, "");
    }

    #[tokio::test]
    async fn test_submit_runs_request_off_loop() {
        let mut app = app();
        open(&mut app);
        type_text(&mut app, "What is new?");
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(app.input_buffer, "");
        assert!(app.session().is_loading());
        let text = screen_text(app.render_to_buffer());
        assert!(text.contains("Assistant is typing..."));

        receive_reply(&mut app).await;
        assert!(!app.session().is_loading());
        assert_eq!(app.session().session_id(), Some("echo-session"));
        assert_eq!(
            app.session().messages().last().unwrap().content,
            "You asked: What is new?\n\nWant more?"
        );
    }

    #[tokio::test]
    async fn test_tab_accepts_follow_up_after_reveal() {
        let mut app = app();
        open(&mut app);
        type_text(&mut app, "Refunds?");
        app.handle_event(key(KeyCode::Enter));
        receive_reply(&mut app).await;

        // Still revealing: Tab does nothing
        app.update(app.last_frame + Duration::from_millis(10));
        app.handle_event(key(KeyCode::Tab));
        assert!(!app.session().is_loading());

        settle(&mut app);
        app.handle_event(key(KeyCode::Tab));
        assert!(app.session().is_loading());
        let messages = app.session().messages();
        assert_eq!(messages[messages.len() - 1].content, "Yes");
    }

    #[tokio::test]
    async fn test_click_on_follow_up() {
        let mut app = app();
        open(&mut app);
        type_text(&mut app, "Refunds?");
        app.handle_event(key(KeyCode::Enter));
        receive_reply(&mut app).await;
        settle(&mut app);
        app.render_to_buffer();

        let (row, follow_up) = app.follow_up_rows[0].clone();
        assert_eq!(follow_up, "Want more?");

        let bounds = app.modal_bounds();
        app.handle_event(click(bounds.x + 2, bounds.y + row));
        assert!(app.session().is_loading());
    }

    #[tokio::test]
    async fn test_ctrl_l_clears_and_reseeds_welcome() {
        let mut app = app();
        open(&mut app);
        type_text(&mut app, "Hi");
        app.handle_event(key(KeyCode::Enter));
        receive_reply(&mut app).await;

        app.handle_event(ctrl('l'));
        assert_eq!(app.session().messages().len(), 1);
        assert_eq!(app.session().session_id(), None);
        assert_eq!(app.display.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_while_waiting_drops_late_reply() {
        let mut app = app();
        open(&mut app);
        type_text(&mut app, "Hi");
        app.handle_event(key(KeyCode::Enter));

        app.handle_event(ctrl('l'));
        receive_reply(&mut app).await;

        assert!(!app.session().is_loading());
        assert_eq!(app.session().session_id(), None);
        assert_eq!(app.session().messages().len(), 1);
        assert_eq!(
            app.session().messages()[0].kind(),
            Some(MessageKind::Welcome)
        );
    }

    #[tokio::test]
    async fn test_esc_closes_then_quits() {
        let mut app = app();
        open(&mut app);

        app.handle_event(key(KeyCode::Esc));
        assert!(matches!(app.modal.state(), ModalState::Closing { .. }));
        assert!(app.is_running());

        app.update(Instant::now() + Duration::from_millis(500));
        assert!(!app.modal.is_visible());

        app.handle_event(key(KeyCode::Esc));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = app();
        app.handle_event(ctrl('c'));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_unconfigured_widget_shows_error() {
        let mut app = app_with(WidgetConfig::default());
        open(&mut app);
        type_text(&mut app, "Hello");
        app.handle_event(key(KeyCode::Enter));

        assert!(!app.session().is_loading());
        let text = screen_text(app.render_to_buffer());
        assert!(text.contains("Configuration error"));
        assert!(text.contains("set --base-url and restart"));
    }

    #[test]
    fn test_wrap_text_keeps_blank_lines() {
        assert_eq!(
            wrap_text("Answer\n\nFollow", 80),
            vec!["Answer".to_string(), String::new(), "Follow".to_string()]
        );
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello world", 5), "hello");
        assert_eq!(truncate_to_width("hi", 5), "hi");
    }
}
