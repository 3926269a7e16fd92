use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub wallet: Rect,
    pub input: Rect,
    pub message: Rect,
    pub results: Rect,
    pub status_line: Rect,
    pub key_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[5]);

    UiAreas {
        size,
        header: vertical[0],
        wallet: vertical[1],
        input: vertical[2],
        message: vertical[3],
        results: vertical[4],
        status_line: footer_chunks[0],
        key_line: footer_chunks[1],
    }
}

/// Number of card columns that fit, mirroring a responsive 1/2/4 grid
pub fn grid_columns(width: u16) -> usize {
    match width {
        0..=79 => 1,
        80..=159 => 2,
        _ => 4,
    }
}
