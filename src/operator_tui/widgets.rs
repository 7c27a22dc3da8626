use ratatui::{
    prelude::*,
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
};

use crate::matching::Candidate;
use crate::ports::operator::ScoredTrack;
use crate::ports::spotify::RemoteTrack;

/// Format milliseconds as M:SS
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn optional_duration(ms: Option<u64>) -> String {
    ms.map(format_duration).unwrap_or_else(|| "--:--".to_string())
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<9}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

/// Metadata panel for the Spotify track being matched
pub fn track_panel(remote: &RemoteTrack) -> Paragraph<'_> {
    let mut lines = vec![
        Line::from(Span::styled(
            remote.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        field("Artists", remote.artists.join(", ")),
        field("Album", remote.album.clone()),
        field("Duration", optional_duration(remote.duration_ms)),
    ];

    if let Some(year) = &remote.release_year {
        lines.push(field("Year", year.clone()));
    }
    if let Some(url) = &remote.external_url {
        lines.push(field("Link", url.clone()));
    }
    if let Some(url) = &remote.preview_url {
        lines.push(field("Preview", url.clone()));
    }
    if let Some(url) = &remote.cover_url {
        lines.push(field("Cover", url.clone()));
    }

    Paragraph::new(lines)
        .block(Block::bordered().title("Spotify track"))
        .wrap(Wrap { trim: false })
}

/// One candidate row: score, title, artist, album and duration
pub fn candidate_item(scored: &ScoredTrack) -> ListItem<'_> {
    let track = &scored.track;
    let score_style = if scored.score >= 80.0 {
        Style::default().fg(Color::Green)
    } else if scored.score >= 50.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:>5.1} ", scored.score), score_style),
        Span::styled(
            track.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    let mut metadata = vec![
        track.primary_artist().to_string(),
        track.album().to_string(),
        optional_duration(track.duration),
    ];
    if let Some(path) = track.file_path() {
        metadata.push(path.to_string());
    }
    lines.push(Line::from(format!("      {}", metadata.join(" | "))));

    ListItem::new(lines)
}

/// Render an input field with focus indicator
pub fn render_input_field(frame: &mut Frame, area: Rect, label: &str, value: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(label)
        .border_style(Style::default().fg(Color::Yellow));

    let text = if value.is_empty() {
        " ".to_string()
    } else {
        value.to_string()
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(paragraph, area);
}
