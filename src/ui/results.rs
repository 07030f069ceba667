/// The strip of query results shown under the image
///
/// Each entry is a small card: the thumbnail on a black backdrop and the
/// score underneath. The strip is rebuilt from the session's result set
/// on every view, so a new result set leaves nothing of the old one behind.
use iced::widget::{column, container, image, row, scrollable, text, tooltip};
use iced::{Alignment, Background, Color, Element, Length};

use crate::state::data::ResultEntry;

/// Black backdrop behind images, as in the main view
pub fn backdrop(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::BLACK)),
        ..container::Style::default()
    }
}

fn card<'a, M: 'a>(entry: &'a ResultEntry, thumbnail_size: u32) -> Element<'a, M> {
    let picture: Element<'a, M> = match &entry.thumbnail {
        Ok(thumb) => image(thumb.handle.clone())
            .width(Length::Fixed(thumb.width as f32))
            .height(Length::Fixed(thumb.height as f32))
            .into(),
        Err(_) => text("?").size(24).into(),
    };

    let framed = container(picture)
        .center_x(Length::Fixed(thumbnail_size as f32))
        .center_y(Length::Fixed(thumbnail_size as f32))
        .style(backdrop);

    let content = column![framed, text(entry.label()).size(14)]
        .spacing(4)
        .align_x(Alignment::Center);

    tooltip(content, text(entry.path.as_str()).size(12), tooltip::Position::Top).into()
}

/// Horizontal strip of result cards, left to right in service order
pub fn view<'a, M: 'a>(results: &'a [ResultEntry], thumbnail_size: u32) -> Element<'a, M> {
    let cards = results.iter().map(|entry| card(entry, thumbnail_size));

    scrollable(row(cards).spacing(12).padding(8))
        .direction(scrollable::Direction::Horizontal(scrollable::Scrollbar::new()))
        .width(Length::Fill)
        .into()
}
