//! Toast notifications.
//!
//! Errors never end the program; they land here. The `Manager` caps how
//! many toasts are visible, queues the rest, and expires them on `Tick`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use iced::widget::{button, column, container, row, text};
use iced::{Background, Border, Color, Element, Length};

use crate::error::ViewerError;

/// Maximum number of notifications visible at once.
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Severity level determines display duration and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    /// Stays until dismissed.
    Error,
}

impl Severity {
    pub fn color(&self) -> Color {
        match self {
            Severity::Info => Color::from_rgb8(0x3b, 0x82, 0xf6),
            Severity::Warning => Color::from_rgb8(0xf5, 0x9e, 0x0b),
            Severity::Error => Color::from_rgb8(0xef, 0x44, 0x44),
        }
    }

    pub fn auto_dismiss_duration(&self) -> Option<Duration> {
        match self {
            Severity::Info => Some(Duration::from_secs(3)),
            Severity::Warning => Some(Duration::from_secs(5)),
            Severity::Error => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    severity: Severity,
    message: String,
    created_at: Instant,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::next(),
            severity,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn expired_at(&self, now: Instant) -> bool {
        self.severity
            .auto_dismiss_duration()
            .is_some_and(|d| now.duration_since(self.created_at) >= d)
    }
}

impl From<&ViewerError> for Notification {
    fn from(err: &ViewerError) -> Self {
        Notification::error(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Dismiss(NotificationId),
    Tick(Instant),
}

#[derive(Debug, Default)]
pub struct Manager {
    /// Newest first
    visible: VecDeque<Notification>,
    queue: VecDeque<Notification>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        match notification.severity() {
            Severity::Error => log::error!("❌ {}", notification.message()),
            Severity::Warning => log::warn!("⚠️  {}", notification.message()),
            Severity::Info => log::info!("{}", notification.message()),
        }

        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(notification);
        } else {
            self.queue.push_back(notification);
        }
    }

    /// Returns `true` if the notification was found and removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.visible.iter().position(|n| n.id() == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }
        if let Some(pos) = self.queue.iter().position(|n| n.id() == id) {
            self.queue.remove(pos);
            return true;
        }
        false
    }

    pub fn tick(&mut self, now: Instant) {
        let expired: Vec<NotificationId> = self
            .visible
            .iter()
            .filter(|n| n.expired_at(now))
            .map(Notification::id)
            .collect();
        for id in expired {
            self.dismiss(id);
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::Dismiss(id) => {
                self.dismiss(id);
            }
            Message::Tick(now) => self.tick(now),
        }
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            match self.queue.pop_front() {
                Some(next) => self.visible.push_back(next),
                None => break,
            }
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn has_notifications(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    /// Toast stack, newest on top
    pub fn view<'a>(&'a self) -> Element<'a, Message> {
        let toasts = self.visible.iter().map(|n| -> Element<'a, Message> {
            let accent = n.severity().color();
            let body = row![
                text(n.message()).size(14).width(Length::Fill),
                button(text("×").size(14))
                    .on_press(Message::Dismiss(n.id()))
                    .padding([2, 8]),
            ]
            .spacing(10);

            container(body)
                .padding(10)
                .width(Length::Fixed(360.0))
                .style(move |_theme| container::Style {
                    background: Some(Background::Color(Color::from_rgb8(0x1f, 0x1f, 0x23))),
                    border: Border {
                        color: accent,
                        width: 2.0,
                        radius: 6.0.into(),
                    },
                    text_color: Some(Color::WHITE),
                    ..container::Style::default()
                })
                .into()
        });

        column(toasts).spacing(8).into()
    }
}
