use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

use blockfall::game::{Game, GameStatus, GRID_HEIGHT, GRID_WIDTH};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FRAME_MS: u64 = 16;

// ============================================================================
// Color Table
// ============================================================================

// Index 0 is the empty cell; 1..=7 follow the kind order I, J, L, O, S, T, Z.
const COLORS: [Color; 8] = [
    Color::Reset,
    Color::Cyan,
    Color::Blue,
    Color::Rgb(255, 128, 0),
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
];

fn cell_color(color_id: u8) -> Color {
    COLORS[usize::from(color_id) % COLORS.len()]
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.status {
        GameStatus::Running => render_game(frame, game, area),
        GameStatus::Paused => render_paused(frame, game, area),
        GameStatus::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let preview_width = 12;
    let info_width = 14;
    let total_width = grid_display_width + preview_width + info_width + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Next][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(preview_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_next(frame, game, horizontal[1]);
    render_info(frame, game, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↑: Rotate | ↓: Soft Drop | Space: Hard Drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The engine hands back the board with the active piece already overlaid.
    let visual_grid = game.render_grid();

    let mut lines: Vec<Line> = Vec::new();

    for row in visual_grid.iter() {
        let mut spans: Vec<Span> = Vec::new();

        for &cell in row.iter() {
            if cell == 0 {
                spans.push(Span::raw(EMPTY_CHAR));
            } else {
                spans.push(Span::styled(
                    BLOCK_CHAR,
                    Style::default().fg(cell_color(cell)),
                ));
            }
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_next(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let shape = &game.next_piece.shape;
    let color = cell_color(game.next_piece.color_id());

    let mut lines: Vec<Line> = vec![Line::from("")];

    for row in shape.rows() {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        for &cell in row.iter() {
            if cell == 0 {
                spans.push(Span::raw(EMPTY_CHAR));
            } else {
                spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
            }
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Lines: {}", game.lines_cleared)),
        Line::from(format!("Level: {}", game.level)),
        Line::from(""),
        Line::from(Span::styled(
            "R: restart | ESC: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut game = Game::new();
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &game))?;

        if event::poll(Duration::from_millis(FRAME_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            game.toggle_pause();
                            if game.status == GameStatus::Running {
                                // Re-baseline the clock so the paused span
                                // does not count toward the next drop.
                                last_frame = Instant::now();
                            }
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            game.reset();
                            last_frame = Instant::now();
                        }
                        // Movement commands; the engine rejects them itself
                        // when the game is paused or over.
                        KeyCode::Left => {
                            game.move_left();
                        }
                        KeyCode::Right => {
                            game.move_right();
                        }
                        KeyCode::Down => {
                            game.soft_drop();
                        }
                        KeyCode::Up => {
                            game.rotate();
                        }
                        KeyCode::Char(' ') => {
                            game.hard_drop();
                        }
                        _ => {}
                    }
                }
            }
        }

        // Advance gravity by the wall-clock time since the last frame.
        let now = Instant::now();
        let delta = now.duration_since(last_frame);
        last_frame = now;
        game.advance_time(delta.as_millis() as u64);

        // This presenter polls state directly; drain the event feed so it
        // cannot grow without bound.
        let _ = game.take_events();
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
