mod render;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notegen_config::Config;
use notegen_engine::editing::{locate_section, section_anchors, table};
use notegen_engine::{
    CellAction, CommandGenerator, ContentGenerator, Document, DocumentSource, EditError, EditKind,
    EditRequest, Editor, FileDraftStore, GenerationError, GenerationRequest, NodeId, TextRange,
    Ticket,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    env, fs,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    sync::mpsc::{self, TryRecvError},
    thread,
    time::Duration,
};

const FAILURE_MESSAGE: &str = "Failed. Please try again.";
const TICK: Duration = Duration::from_millis(100);

/// What a generator run was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Edit(Ticket),
    NewDocument,
    AppendDocument,
    ExtendTable,
}

struct JobResult {
    job: Job,
    result: Result<String, GenerationError>,
}

/// What the text typed into the prompt line will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPurpose {
    Topic,
    RawText,
    AppendTopic,
    MoreRows,
    SectionEdit(EditKind),
    SelectionText,
    CellEdit(CellAction),
}

impl PromptPurpose {
    fn label(self) -> String {
        match self {
            PromptPurpose::Topic => "Topic".to_string(),
            PromptPurpose::RawText => "Text to turn into notes".to_string(),
            PromptPurpose::AppendTopic => "Add another on".to_string(),
            PromptPurpose::MoreRows => "More rows".to_string(),
            PromptPurpose::SectionEdit(kind) => format!("{} instruction", kind.label()),
            PromptPurpose::SelectionText => "Text to rewrite".to_string(),
            PromptPurpose::CellEdit(CellAction::Rewrite) => "Cell rewrite instruction".to_string(),
            PromptPurpose::CellEdit(CellAction::Expand) => "Cell expand instruction".to_string(),
        }
    }
}

enum Mode {
    Normal,
    Prompt { purpose: PromptPurpose, input: String },
}

struct App {
    editor: Editor<FileDraftStore>,
    generator: Option<CommandGenerator>,
    anchors: Vec<NodeId>,
    outline_state: ListState,
    /// Column and body row selected inside a table anchor
    column: usize,
    row: usize,
    mode: Mode,
    status: String,
    inflight: Option<Job>,
    receiver: Option<mpsc::Receiver<JobResult>>,
}

impl App {
    fn new(config: &Config) -> Self {
        let store = FileDraftStore::new(&config.draft_path);
        let editor = Editor::open(store).with_settings(config.generation_settings());
        let generator = config.generator.as_ref().map(|generator| generator.build());
        let status = match &generator {
            Some(generator) => format!("Generator: {}", generator.program()),
            None => format!(
                "No generator configured; add [generator] to {}",
                Config::config_path().display()
            ),
        };

        let mut app = Self {
            editor,
            generator,
            anchors: Vec::new(),
            outline_state: ListState::default(),
            column: 0,
            row: 0,
            mode: Mode::Normal,
            status,
            inflight: None,
            receiver: None,
        };
        app.refresh_outline();
        app
    }

    /// Recompute anchors after the document changed; keeps the selection
    /// index where possible since node ids do not survive re-rendering.
    fn refresh_outline(&mut self) {
        self.anchors = section_anchors(self.editor.document());
        let selected = match self.outline_state.selected() {
            _ if self.anchors.is_empty() => None,
            Some(i) => Some(i.min(self.anchors.len() - 1)),
            None => Some(0),
        };
        self.outline_state.select(selected);
    }

    fn selected_anchor(&self) -> Option<NodeId> {
        self.outline_state
            .selected()
            .and_then(|i| self.anchors.get(i).copied())
    }

    fn selected_table(&self) -> Option<NodeId> {
        let anchor = self.selected_anchor()?;
        (self.editor.document().tag_name(anchor) == Some("table")).then_some(anchor)
    }

    fn selected_cell(&self) -> Option<NodeId> {
        let table = self.selected_table()?;
        let doc = self.editor.document();
        let row = *table::body_rows(doc, table).get(self.row)?;
        table::cells(doc, row).get(self.column).copied()
    }

    fn next_anchor(&mut self) {
        if self.anchors.is_empty() {
            return;
        }
        let i = match self.outline_state.selected() {
            Some(i) => (i + 1) % self.anchors.len(),
            None => 0,
        };
        self.outline_state.select(Some(i));
        self.column = 0;
        self.row = 0;
    }

    fn previous_anchor(&mut self) {
        if self.anchors.is_empty() {
            return;
        }
        let i = match self.outline_state.selected() {
            Some(0) | None => self.anchors.len() - 1,
            Some(i) => i - 1,
        };
        self.outline_state.select(Some(i));
        self.column = 0;
        self.row = 0;
    }

    /// (body rows, widest row) of the selected table, or zeros.
    fn table_shape(&self) -> (usize, usize) {
        let Some(table) = self.selected_table() else {
            return (0, 0);
        };
        let doc = self.editor.document();
        let width = table::rows(doc, table)
            .into_iter()
            .map(|row| table::cells(doc, row).len())
            .max()
            .unwrap_or(0);
        (table::body_rows(doc, table).len(), width)
    }

    fn move_column(&mut self, forward: bool) {
        let (_, width) = self.table_shape();
        if forward && self.column + 1 < width {
            self.column += 1;
        } else if !forward {
            self.column = self.column.saturating_sub(1);
        }
    }

    fn move_row(&mut self, forward: bool) {
        let (rows, _) = self.table_shape();
        if forward && self.row + 1 < rows {
            self.row += 1;
        } else if !forward {
            self.row = self.row.saturating_sub(1);
        }
    }

    fn undo(&mut self) {
        self.status = if self.editor.undo() {
            "Undone".to_string()
        } else {
            "Nothing to undo".to_string()
        };
        self.refresh_outline();
    }

    fn redo(&mut self) {
        self.status = if self.editor.redo() {
            "Redone".to_string()
        } else {
            "Nothing to redo".to_string()
        };
        self.refresh_outline();
    }

    fn clear(&mut self) {
        self.editor.clear();
        self.inflight = None;
        self.receiver = None;
        self.status = "Cleared".to_string();
        self.refresh_outline();
    }

    fn open_prompt(&mut self, purpose: PromptPurpose) {
        if self.busy() {
            return;
        }
        self.mode = Mode::Prompt {
            purpose,
            input: String::new(),
        };
    }

    fn submit_prompt(&mut self, purpose: PromptPurpose, input: String) {
        match purpose {
            PromptPurpose::Topic => {
                let request = self.editor.document_request(DocumentSource::Topic, &input);
                self.spawn(Job::NewDocument, request);
            }
            PromptPurpose::RawText => {
                let request = self.editor.document_request(DocumentSource::Text, &input);
                self.spawn(Job::NewDocument, request);
            }
            PromptPurpose::AppendTopic => {
                let request = self.editor.document_request(DocumentSource::Topic, &input);
                self.spawn(Job::AppendDocument, request);
            }
            PromptPurpose::MoreRows => match self.editor.table_extension_request(&input) {
                Ok(request) => self.spawn(Job::ExtendTable, request),
                Err(e) => self.status = e.to_string(),
            },
            PromptPurpose::SectionEdit(kind) => {
                let Some(anchor) = self.selected_anchor() else {
                    return;
                };
                let begun = self.editor.begin_section_edit(anchor, kind, &input);
                self.start_edit(begun);
            }
            PromptPurpose::SelectionText => {
                let doc = self.editor.document();
                let Some(range) = TextRange::find(doc, doc.root(), &input) else {
                    self.status = format!("\"{input}\" not found");
                    return;
                };
                let begun = self.editor.begin_selection_edit(range, EditKind::Rewrite, "");
                self.start_edit(begun);
            }
            PromptPurpose::CellEdit(action) => {
                let Some(cell) = self.selected_cell() else {
                    self.status = "Select a table cell first".to_string();
                    return;
                };
                let begun = self.editor.begin_cell_edit(cell, action, &input);
                self.start_edit(begun);
            }
        }
    }

    fn cycle_format(&mut self) {
        let settings = self.editor.settings_mut();
        settings.format = settings.format.next();
        self.status = format!("Format: {}", settings.format);
    }

    fn rewrite_column(&mut self) {
        if self.busy() {
            return;
        }
        let Some(table) = self.selected_table() else {
            return;
        };
        let begun = self.editor.begin_column_rewrite(table, self.column);
        self.start_edit(begun);
    }

    fn table_op(&mut self, op: TableOp) {
        let Some(table) = self.selected_table() else {
            return;
        };
        let doc = self.editor.document();
        let rows = table::body_rows(doc, table);
        let result = match op {
            TableOp::AddRow => match rows.get(self.row).or(rows.last()) {
                Some(row) => self.editor.insert_row_after(*row).map(|_| ()),
                None => return,
            },
            TableOp::DeleteRow => match rows.get(self.row) {
                Some(row) => self.editor.delete_row(*row),
                None => return,
            },
            TableOp::AddColumn => self.editor.insert_column_after(table, self.column),
            TableOp::DeleteColumn => self.editor.delete_column(table, self.column),
        };
        match result {
            Ok(()) => self.status = format!("{op:?} done"),
            Err(e) => {
                log::warn!("{op:?} failed: {e}");
                self.status = FAILURE_MESSAGE.to_string();
            }
        }
        self.refresh_outline();
        let (rows, width) = self.table_shape();
        self.row = self.row.min(rows.saturating_sub(1));
        self.column = self.column.min(width.saturating_sub(1));
    }

    fn start_edit(&mut self, begun: Result<EditRequest, EditError>) {
        match begun {
            Ok(edit) => {
                self.refresh_outline();
                self.spawn(Job::Edit(edit.ticket), edit.request);
            }
            Err(e) => {
                log::warn!("could not start edit: {e}");
                self.status = e.to_string();
            }
        }
    }

    fn busy(&self) -> bool {
        self.inflight.is_some() || self.editor.is_pending()
    }

    fn spawn(&mut self, job: Job, request: GenerationRequest) {
        let Some(generator) = self.generator.clone() else {
            self.abandon(job, "no generator");
            self.status = "No generator configured".to_string();
            return;
        };

        let (tx, rx) = mpsc::channel();
        let work = move || {
            let result = generator.generate(&request);
            let _ = tx.send(JobResult { job, result });
        };

        if thread::Builder::new()
            .name("notegen-generate".to_owned())
            .spawn(work)
            .is_err()
        {
            log::warn!("failed to spawn generator worker");
            self.abandon(job, "worker did not start");
            self.status = FAILURE_MESSAGE.to_string();
            return;
        }
        self.inflight = Some(job);
        self.receiver = Some(rx);
        self.status = "Generating...".to_string();
    }

    /// Give up on `job` without a result. An AI edit is resolved as failed
    /// so its pending slot is released.
    fn abandon(&mut self, job: Job, reason: &str) {
        self.inflight = None;
        self.receiver = None;
        if let Job::Edit(ticket) = job {
            let _ = self
                .editor
                .resolve(ticket, Err(GenerationError::Unavailable(reason.to_string())));
            self.refresh_outline();
        }
    }

    fn poll_worker(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let message = match receiver.try_recv() {
            Ok(message) => message,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                let Some(job) = self.inflight else {
                    self.receiver = None;
                    return;
                };
                JobResult {
                    job,
                    result: Err(GenerationError::Unavailable("worker exited".to_string())),
                }
            }
        };
        self.receiver = None;
        if self.inflight != Some(message.job) {
            return;
        }
        self.inflight = None;

        let outcome = match (message.job, message.result) {
            (Job::Edit(ticket), result) => self.editor.resolve(ticket, result).map(|_| ()),
            (Job::NewDocument | Job::ExtendTable, Ok(html)) => self.editor.load_generated(&html),
            (Job::AppendDocument, Ok(html)) => self.editor.append_generated(&html).map(|_| ()),
            (_, Err(e)) => Err(e.into()),
        };
        match outcome {
            Ok(()) => self.status = "Done".to_string(),
            Err(e) => {
                log::warn!("{:?} failed: {e}", message.job);
                self.status = FAILURE_MESSAGE.to_string();
            }
        }
        self.refresh_outline();
    }
}

#[derive(Debug, Clone, Copy)]
enum TableOp {
    AddRow,
    DeleteRow,
    AddColumn,
    DeleteColumn,
}

fn init_logging(config: &Config) -> Result<()> {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // The terminal belongs to the TUI, so log lines go to a file
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let import = match args.len() {
        1 => None,
        2 => Some(PathBuf::from(&args[1])),
        _ => {
            eprintln!("Usage: {} [document.html]", args[0]);
            process::exit(1);
        }
    };

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    init_logging(&config)?;
    log::info!("notegen starting, draft at {}", config.draft_path.display());

    let mut app = App::new(&config);
    if let Some(path) = import {
        let html = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        app.editor.load_generated(&html)?;
        app.refresh_outline();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.poll_worker();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Mode::Prompt { purpose, input } = &mut app.mode {
            match key.code {
                KeyCode::Esc => app.mode = Mode::Normal,
                KeyCode::Enter => {
                    let (purpose, input) = (*purpose, std::mem::take(input));
                    app.mode = Mode::Normal;
                    app.submit_prompt(purpose, input);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Down | KeyCode::Char('j') => app.next_anchor(),
            KeyCode::Up | KeyCode::Char('k') => app.previous_anchor(),
            KeyCode::Left | KeyCode::Char('h') => app.move_column(false),
            KeyCode::Right | KeyCode::Char('l') => app.move_column(true),
            KeyCode::Char('J') => app.move_row(true),
            KeyCode::Char('K') => app.move_row(false),
            KeyCode::Char('u') => app.undo(),
            KeyCode::Char('r') => app.redo(),
            KeyCode::Char('X') => app.clear(),
            KeyCode::Char('g') => app.open_prompt(PromptPurpose::Topic),
            KeyCode::Char('T') => app.open_prompt(PromptPurpose::RawText),
            KeyCode::Char('a') => app.open_prompt(PromptPurpose::AppendTopic),
            KeyCode::Char('x') => app.open_prompt(PromptPurpose::MoreRows),
            KeyCode::Char('f') => app.cycle_format(),
            KeyCode::Char('s') => app.open_prompt(PromptPurpose::SelectionText),
            KeyCode::Char('w') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::Rewrite)),
            KeyCode::Char('e') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::Expand)),
            KeyCode::Char('c') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::Continue)),
            KeyCode::Char('n') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::NextTopic)),
            KeyCode::Char('d') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::Diagram)),
            KeyCode::Char('t') => app.open_prompt(PromptPurpose::SectionEdit(EditKind::Table)),
            KeyCode::Char('W') => app.open_prompt(PromptPurpose::CellEdit(CellAction::Rewrite)),
            KeyCode::Char('E') => app.open_prompt(PromptPurpose::CellEdit(CellAction::Expand)),
            KeyCode::Char('R') => app.rewrite_column(),
            KeyCode::Char('o') => app.table_op(TableOp::AddRow),
            KeyCode::Char('O') => app.table_op(TableOp::DeleteRow),
            KeyCode::Char('i') => app.table_op(TableOp::AddColumn),
            KeyCode::Char('I') => app.table_op(TableOp::DeleteColumn),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(2)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(rows[0]);

    let doc = app.editor.document();

    // Outline panel
    let outline_items: Vec<ListItem> = app
        .anchors
        .iter()
        .map(|anchor| {
            let name = doc.tag_name(*anchor).unwrap_or("?");
            let indent = match name {
                "h1" => 0,
                "h2" => 1,
                "h3" => 2,
                _ => 3,
            };
            let mut text = doc.text_content(*anchor);
            text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.chars().count() > 40 {
                text = text.chars().take(39).collect::<String>() + "…";
            }
            let display_text = format!("{}{name} {text}", "  ".repeat(indent));
            ListItem::new(vec![Line::from(vec![Span::raw(display_text)])])
        })
        .collect();

    let outline = List::new(outline_items)
        .block(Block::default().borders(Borders::ALL).title("Outline"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    // Content panel, with the selected section highlighted
    let section = app
        .selected_anchor()
        .and_then(|anchor| locate_section(doc, anchor));
    let highlighted: Vec<NodeId> = section
        .map(|section| {
            section
                .nodes
                .iter()
                .map(|node| top_level(doc, *node))
                .collect()
        })
        .unwrap_or_default();

    let content_text: Vec<Line> = if doc.is_empty() {
        vec![Line::from("Empty document. Press g to generate notes on a topic.")]
    } else {
        render::render_document(doc)
            .into_iter()
            .map(|line| {
                let style = if highlighted.contains(&line.node) {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(vec![Span::styled(line.text, style)])
            })
            .collect()
    };

    let title = match app.selected_table() {
        Some(_) => format!("Document (row {}, column {})", app.row + 1, app.column + 1),
        None => "Document".to_string(),
    };
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_stateful_widget(outline, chunks[0], &mut app.outline_state);
    f.render_widget(content, chunks[1]);

    // Status or prompt line
    let status_line = match &app.mode {
        Mode::Prompt { purpose, input } => Line::from(vec![
            Span::styled(format!("{}: ", purpose.label()), Style::default().fg(Color::Cyan)),
            Span::raw(input.clone()),
        ]),
        Mode::Normal => {
            let history = app.editor.history();
            let settings = app.editor.settings();
            Line::from(vec![
                Span::raw(app.status.clone()),
                Span::styled(
                    format!(
                        "  [{} in {}] [history {}/{}]",
                        settings.format,
                        settings.language,
                        history.cursor().map_or(0, |c| c + 1),
                        history.len()
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
    };
    f.render_widget(Paragraph::new(vec![status_line]), rows[1]);

    // Instructions
    let help_text = vec![
        Line::from(vec![
            Span::raw("q: Quit | ↑/k ↓/j: Section | u: Undo | r: Redo | g/T: Topic/Text | a: Add | x: More rows | f: Format | s: Rewrite text | X: Clear"),
        ]),
        Line::from(vec![
            Span::raw("w/e/c/n/d/t: Rewrite/Expand/Continue/Next/Diagram/Table | Tables: h/l J/K move, W/E cell, R column, o/O row, i/I column"),
        ]),
    ];
    f.render_widget(Paragraph::new(help_text).block(Block::default()), rows[2]);
}

fn top_level(doc: &Document, mut node: NodeId) -> NodeId {
    while let Some(parent) = doc.parent(node) {
        if parent == doc.root() {
            break;
        }
        node = parent;
    }
    node
}
