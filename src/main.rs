use iced::widget::{button, column, container, image, row, scrollable, stack, text, Column};
use iced::{task, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::time::Duration;

use pilview::error::ViewerError;
use pilview::query::{self, FetchedResult, QueryClient};
use pilview::state::session::ViewerSession;
use pilview::ui::notifications::{self, Notification};
use pilview::{config, imaging, ui};

// The `image` widget shadows the crate name in this file
use ::image as image_rs;

/// Extensions offered by the open dialog
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "ico", "pbm", "pgm", "ppm", "tga",
];

/// Main application state
struct PilView {
    /// The image, its display handle and the latest results
    session: ViewerSession,
    config: config::Config,
    /// `Err` if the HTTP client could not be built; queries then report it
    client: Result<QueryClient, ViewerError>,
    notifications: notifications::Manager,
    /// Abort handle of the query in flight, if any
    query_task: Option<task::Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open File"
    OpenFile,
    /// Background decode finished for the open with the given generation
    ImageLoaded(u64, PathBuf, Result<image_rs::DynamicImage, ViewerError>),
    /// User clicked "Blur"
    Blur,
    /// Background blur finished for the given image revision
    Blurred(u64, Option<image_rs::DynamicImage>),
    /// User clicked "Query"
    Query,
    /// Answer (or failure) for the query with the given generation
    QueryFinished(u64, Result<Vec<FetchedResult>, ViewerError>),
    /// User clicked "Cancel" while a query was running
    CancelQuery,
    Notification(notifications::Message),
}

impl PilView {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = config::load();
        let client = QueryClient::new(&config.endpoint, config.request_timeout());
        let mut notifications = notifications::Manager::new();

        if let Err(e) = &client {
            notifications.push(Notification::from(e));
        }

        log::info!("🎨 Image viewer ready, similarity service at {}", config.endpoint);

        (
            PilView {
                session: ViewerSession::new(),
                config,
                client,
                notifications,
                query_task: None,
            },
            Task::none(),
        )
    }

    fn title(&self) -> String {
        match self.session.source().and_then(|p| p.file_name()) {
            Some(name) => format!("Image Viewer - {}", name.to_string_lossy()),
            None => "Image Viewer".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Open Image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();

                // A cancelled dialog leaves everything as it was
                let Some(path) = picked else {
                    return Task::none();
                };

                let generation = self.session.begin_open();
                Task::perform(imaging::loader::load_image(path.clone()), move |result| {
                    Message::ImageLoaded(generation, path.clone(), result)
                })
            }
            Message::ImageLoaded(generation, path, result) => {
                match result {
                    Ok(image) => {
                        self.session.finish_open(generation, path, image);
                    }
                    Err(e) => {
                        if self.session.fail_open(generation) {
                            self.notifications.push(Notification::from(&e));
                        }
                    }
                }
                Task::none()
            }
            Message::Blur => match self.session.begin_blur() {
                Ok(Some(job)) => self.spawn_blur(job),
                Ok(None) => {
                    log::debug!("Blur queued behind the running one");
                    Task::none()
                }
                Err(e) => {
                    self.notifications.push(Notification::from(&e));
                    Task::none()
                }
            },
            Message::Blurred(revision, blurred) => {
                match blurred {
                    Some(blurred) => {
                        if !self.session.apply_blur(revision, blurred) {
                            log::debug!("Discarding blur of a replaced image");
                        }
                    }
                    None => self.session.fail_blur(revision),
                }
                match self.session.next_queued_blur() {
                    Some(job) => self.spawn_blur(job),
                    None => Task::none(),
                }
            }
            Message::Query => self.start_query(),
            Message::QueryFinished(generation, result) => {
                self.finish_query(generation, result);
                Task::none()
            }
            Message::CancelQuery => {
                if let Some(handle) = self.query_task.take() {
                    handle.abort();
                }
                self.session.cancel_query();
                self.notifications.push(Notification::info("Query cancelled"));
                Task::none()
            }
            Message::Notification(message) => {
                self.notifications.handle_message(message);
                Task::none()
            }
        }
    }

    fn spawn_blur(&self, (revision, image): (u64, image_rs::DynamicImage)) -> Task<Message> {
        Task::perform(
            imaging::filter::blur_async(image, self.config.blur_sigma),
            move |blurred| Message::Blurred(revision, blurred),
        )
    }

    fn start_query(&mut self) -> Task<Message> {
        // Check the session first: with no image nothing is sent
        let pending = match self.session.begin_query() {
            Ok(pending) => pending,
            Err(e) => {
                self.notifications.push(Notification::from(&e));
                return Task::none();
            }
        };

        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(e) => {
                self.session.fail_query(pending.generation);
                self.notifications.push(Notification::from(e));
                return Task::none();
            }
        };

        if let Some(previous) = self.query_task.take() {
            previous.abort();
        }

        log::info!("📤 Query {} to {}", pending.generation, client.endpoint());

        let generation = pending.generation;
        let (task, handle) = Task::perform(
            query::fetch_results(client, pending.image, self.config.thumbnail_size),
            move |result| Message::QueryFinished(generation, result),
        )
        .abortable();

        self.query_task = Some(handle);
        task
    }

    fn finish_query(&mut self, generation: u64, result: Result<Vec<FetchedResult>, ViewerError>) {
        match result {
            Ok(fetched) => {
                let total = fetched.len();
                let missing = fetched.iter().filter(|r| r.thumbnail.is_err()).count();

                if self.session.finish_query(generation, fetched) {
                    self.query_task = None;
                    log::info!("✅ Query {}: {} results", generation, total);
                    if missing > 0 {
                        self.notifications.push(Notification::warning(format!(
                            "{} of {} results could not be loaded",
                            missing, total
                        )));
                    }
                }
            }
            Err(e) => {
                if self.session.fail_query(generation) {
                    self.query_task = None;
                    self.notifications.push(Notification::from(&e));
                }
            }
        }
    }

    fn status_line(&self) -> String {
        let mut parts = vec![format!("Page {}", self.session.page_label())];

        if let Some(display) = self.session.display() {
            parts.push(format!("{}x{}", display.width, display.height));
        }
        if let Some(source) = self.session.source() {
            parts.push(source.display().to_string());
        }
        if self.session.is_opening() {
            parts.push("Opening…".to_string());
        }
        if self.session.is_blurring() {
            parts.push("Blurring…".to_string());
        }
        if self.session.is_querying() {
            parts.push("Querying…".to_string());
        }

        parts.join("  ·  ")
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let has_image = self.session.has_image();

        let mut toolbar = row![
            button("Open File").on_press(Message::OpenFile).padding(10),
            button("Blur")
                .on_press_maybe(has_image.then_some(Message::Blur))
                .padding(10),
            button("Query")
                .on_press_maybe(has_image.then_some(Message::Query))
                .padding(10),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        if self.session.is_querying() {
            toolbar = toolbar.push(button("Cancel").on_press(Message::CancelQuery).padding(10));
        }

        let picture: Element<Message> = match self.session.display() {
            Some(display) => scrollable(
                container(
                    image(display.handle.clone())
                        .width(Length::Fixed(display.width as f32))
                        .height(Length::Fixed(display.height as f32)),
                )
                .style(ui::results::backdrop),
            )
            .direction(scrollable::Direction::Both {
                vertical: scrollable::Scrollbar::new(),
                horizontal: scrollable::Scrollbar::new(),
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => container(text("Open an image to get started").size(18))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let content: Column<Message> = column![
            toolbar,
            text(self.status_line()).size(14),
            picture,
            ui::results::view(self.session.results(), self.config.thumbnail_size),
        ]
        .spacing(10)
        .padding(16);

        let toasts = container(self.notifications.view().map(Message::Notification))
            .align_right(Length::Fill)
            .align_bottom(Length::Fill)
            .padding(16);

        stack![content, toasts].into()
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.notifications.has_notifications() {
            iced::time::every(Duration::from_millis(500))
                .map(|now| Message::Notification(notifications::Message::Tick(now)))
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(PilView::title, PilView::update, PilView::view)
        .theme(PilView::theme)
        .subscription(PilView::subscription)
        .centered()
        .run_with(PilView::new)
}
