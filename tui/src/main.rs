mod config;

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hangul_ime_core::ime::{Action, Action3, ImeState};
use hangul_ime_core::layout::{self, Token2, Token3};
use ratatui::layout::{Constraint, Layout as TuiLayout};
use ratatui::style::{Style, Stylize};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use ratatui::{DefaultTerminal, Frame};

use config::{Config, Layout as LayoutMode};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("failed to load config, falling back to defaults: {err}");
        Config::default()
    });

    let terminal = ratatui::init();
    let result = run(terminal, config);
    ratatui::restore();
    result
}

fn run(mut terminal: DefaultTerminal, config: Config) -> Result<()> {
    let mut app = App::new(config);

    loop {
        terminal.draw(|frame| render(frame, &app))?;

        match event::read()? {
            Event::Key(key) if handle_key(&mut app, key) => break Ok(()),
            Event::Resize(_, _) => {}
            _ => {}
        }
    }
}

#[derive(Debug)]
struct App {
    layout_mode: LayoutMode,
    state: ImeState,
    committed: String,
    status: String,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            layout_mode: config.default_layout,
            state: ImeState::new(),
            committed: String::new(),
            status: "Type roman keys. Tab toggles 2-Bulsik/3-Bulsik. Esc quits.".to_string(),
        }
    }

    fn composed_text(&self) -> String {
        let in_progress = self.state.to_codepoint();
        match char::from_u32(in_progress) {
            Some(c) if in_progress != 0 => format!("{}{}", self.committed, c),
            _ => self.committed.clone(),
        }
    }

    fn push_committed(&mut self, cp: u32) {
        if cp == 0 {
            return;
        }
        if let Some(c) = char::from_u32(cp) {
            self.committed.push(c);
        }
    }

    fn toggle_layout(&mut self) {
        let cp = self.state.commit();
        self.push_committed(cp);
        self.layout_mode = match self.layout_mode {
            LayoutMode::TwoBulsik => LayoutMode::ThreeBulsik,
            LayoutMode::ThreeBulsik => LayoutMode::TwoBulsik,
        };
        self.status = format!("Switched to {:?}", self.layout_mode);
    }

    fn backspace(&mut self) {
        match self.state.backspace() {
            None => {
                self.committed.pop();
                self.status = "Removed last committed character".to_string();
            }
            Some(_) => {
                self.status = "Backspaced within composition".to_string();
            }
        }
    }

    fn commit(&mut self) {
        let cp = self.state.commit();
        self.push_committed(cp);
        self.status = "Committed".to_string();
    }

    fn handle_char(&mut self, key_char: char) {
        match self.layout_mode {
            LayoutMode::TwoBulsik => self.handle_char_2bulsik(key_char),
            LayoutMode::ThreeBulsik => self.handle_char_3bulsik(key_char),
        }
    }

    fn handle_char_2bulsik(&mut self, key_char: char) {
        let shift = key_char.is_ascii_uppercase();
        let key_byte = key_char.to_ascii_lowercase() as u8;
        let token = layout::key2_to_token(key_byte, shift);
        if token == Token2::Unmapped {
            self.status = format!("'{key_char}' is not mapped in 2-Bulsik");
            return;
        }
        let result = self.state.process_key_2bulsik(token);
        match result.action {
            Action::NoChange => self.status = "No change".to_string(),
            Action::Replace => self.status = "Composing".to_string(),
            Action::EmitAndNew => {
                self.push_committed(result.prev_cp);
                self.status = "Emitted previous syllable".to_string();
            }
        }
    }

    fn handle_char_3bulsik(&mut self, key_char: char) {
        let Ok(ascii) = u8::try_from(key_char as u32) else {
            self.status = format!("'{key_char}' is not an ASCII key");
            return;
        };
        let token = layout::key3_to_token(ascii);
        if token == Token3::Unmapped {
            self.status = format!("'{key_char}' is not mapped in 3-Bulsik");
            return;
        }
        let result = self.state.process_key_3bulsik(token);
        match result.action {
            Action3::NoChange => self.status = "No change".to_string(),
            Action3::Replace => self.status = "Composing".to_string(),
            Action3::EmitAndNew => {
                self.push_committed(result.prev_cp);
                self.status = "Emitted previous syllable".to_string();
            }
            Action3::Literal => {
                self.push_committed(result.prev_cp);
                self.push_committed(result.literal_cp);
                self.status = "Inserted literal".to_string();
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Tab => app.toggle_layout(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.commit(),
        KeyCode::Char(c) => app.handle_char(c),
        _ => {}
    }

    false
}

fn render(frame: &mut Frame, app: &App) {
    let layout = TuiLayout::vertical([
        Constraint::Length(4),
        Constraint::Min(5),
        Constraint::Length(4),
    ])
    .split(frame.area());

    let header_text = format!(
        "Hangul IME ({:?})\nr=ㄱ s=ㄴ e=ㄷ f=ㄹ a=ㅁ q=ㅂ t=ㅅ d=ㅇ w=ㅈ c=ㅊ z=ㅋ x=ㅌ v=ㅍ g=ㅎ; k=ㅏ o=ㅐ i=ㅑ j=ㅓ p=ㅔ u=ㅕ h=ㅗ y=ㅛ n=ㅜ b=ㅠ m=ㅡ l=ㅣ. Shift for double consonants/ㅒ/ㅖ.\nTab: switch layout. Enter: commit. Esc/Ctrl+C: quit.",
        app.layout_mode
    );
    let header_block = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).title("Instructions"))
        .style(Style::default().bold());

    let body_block = Paragraph::new(app.composed_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1))
                .title("Composed Text"),
        )
        .style(Style::default().italic());

    let footer_block = Paragraph::new(app.status.clone())
        .block(Block::default().borders(Borders::ALL).title("Status"));

    frame.render_widget(header_block, layout[0]);
    frame.render_widget(body_block, layout[1]);
    frame.render_widget(footer_block, layout[2]);
}
