//! Main application state and logic for the BuildShift TUI.
//!
//! The `App` struct owns the view state, the async runtime, and the channel
//! carrying completed fetches back into the draw loop. Mutations follow the
//! dashboard's optimistic policy: local state changes first, the backend
//! notification is fire-and-forget, and failures surface in the status line
//! without a rollback.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::info;

use buildshift_api::{ApiClient, SessionQuery};
use buildshift_core::config::Config;
use buildshift_core::error::{BuildShiftError, Result};
use buildshift_core::types::{Machine, TaskStatus};
use buildshift_data::lifecycle::{self, TaskAction};

use crate::analytics_panel::AnalyticsPanel;
use crate::data::{DashboardData, DrillDown, FetchOutcome, MachineForm, TaskForm};
use crate::editor_panel::EditorPanel;
use crate::event::{AppEvent, InputHandler};
use crate::leaderboard_panel::LeaderboardPanel;
use crate::machines_panel::MachinesPanel;
use crate::overview_panel::OverviewPanel;
use crate::recipes_panel::RecipesPanel;
use crate::tasks_panel::TasksPanel;
use crate::theme::Theme;
use crate::view::View;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Event poll timeout per loop iteration.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long transient status messages stay on screen.
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Main application state.
pub struct App {
    config: Config,
    client: ApiClient,
    runtime: tokio::runtime::Runtime,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    current_view: View,
    input_handler: InputHandler,
    data: DashboardData,
    theme: Theme,
    should_quit: bool,
    show_help: bool,
    dirty: bool,
    status_set_at: Instant,
}

impl App {
    /// Create a new app instance from the dashboard config.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| BuildShiftError::internal(format!("failed to start runtime: {e}")))?;
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let mut data = DashboardData::default();
        data.machines.window = buildshift_data::window::PageWindow::new(config.page_size);
        data.tasks.window = buildshift_data::window::PageWindow::new(config.page_size);
        data.leaderboard.window = buildshift_data::window::PageWindow::new(config.page_size);

        Ok(Self {
            config,
            client,
            runtime,
            outcome_tx,
            outcome_rx,
            current_view: View::default(),
            input_handler: InputHandler::new(),
            data,
            theme: Theme::default(),
            should_quit: false,
            show_help: false,
            dirty: true,
            status_set_at: Instant::now(),
        })
    }

    /// Returns the current view.
    pub fn current_view(&self) -> View {
        self.current_view
    }

    /// Returns whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.data.status_message = Some(message.into());
        self.status_set_at = Instant::now();
        self.mark_dirty();
    }

    // ========================================================
    // Fetch spawning
    // ========================================================

    fn fetch_machines(&mut self) {
        let tag = self.data.machines.generation.begin();
        self.data.machines.loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_machines().await;
            let _ = tx.send(FetchOutcome::Machines(tag, result));
        });
    }

    fn fetch_tasks(&mut self) {
        let tag = self.data.tasks.generation.begin();
        self.data.tasks.loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let database = self.config.tasks_database.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_notion_tasks(&database).await;
            let _ = tx.send(FetchOutcome::Tasks(tag, result));
        });
    }

    fn fetch_leaderboard(&mut self) {
        let tag = self.data.leaderboard.generation.begin();
        self.data.leaderboard.loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let database = self.config.leaderboard_database.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_leaderboard(&database).await;
            let _ = tx.send(FetchOutcome::Leaderboard(tag, result));
        });
    }

    fn fetch_sessions(&mut self) {
        let tag = self.data.analytics.generation.begin();
        self.data.analytics.loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_counter_sessions(&SessionQuery::default()).await;
            let _ = tx.send(FetchOutcome::Sessions(tag, result));
        });
    }

    fn fetch_user_sessions(&mut self, user: String) {
        let tag = self.data.leaderboard.drill_generation.begin();
        self.data.leaderboard.drill = Some(DrillDown {
            user: user.clone(),
            samples: Vec::new(),
            loading: true,
        });
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .fetch_counter_sessions(&SessionQuery::for_user(user.clone()))
                .await;
            let _ = tx.send(FetchOutcome::UserSessions(tag, user, result));
        });
    }

    fn fetch_recipe_list(&mut self) {
        let tag = self.data.recipes.list_generation.begin();
        self.data.recipes.list_loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let database_id = self.config.recipe_database_id.clone();
        let integration = self.config.notion_integration.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_recipe_list(&database_id, &integration).await;
            let _ = tx.send(FetchOutcome::RecipeList(tag, result));
        });
    }

    fn fetch_recipe_detail(&mut self) {
        let Some(option) = self.data.recipes.selected_option().cloned() else {
            return;
        };
        let tag = self.data.recipes.detail_generation.begin();
        self.data.recipes.detail_loading = true;
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let integration = self.config.notion_integration.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_recipe(&option, &integration).await;
            let _ = tx.send(FetchOutcome::RecipeDetail(tag, result));
        });
    }

    fn compute_recipe(&mut self) {
        let Some(recipe) = &self.data.recipes.recipe else {
            return;
        };
        let recipe_id = recipe.id.clone();
        let tag = self.data.recipes.compute_generation.begin();
        self.data.recipes.computing = true;
        let inputs = self.data.recipes.inputs.clone();
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let integration = self.config.notion_integration.clone();
        self.runtime.spawn(async move {
            let result = client.compute_recipe(&recipe_id, &integration, &inputs).await;
            let _ = tx.send(FetchOutcome::RecipeComputed(tag, result));
        });
        self.mark_dirty();
    }

    fn spawn_mutation<F>(&self, label: &str, fut: F)
    where
        F: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let tx = self.outcome_tx.clone();
        let label = label.to_string();
        self.runtime.spawn(async move {
            let result = fut.await;
            let _ = tx.send(FetchOutcome::Mutation(label, result));
        });
    }

    /// Refresh the data behind the current view.
    fn refresh_current(&mut self) {
        match self.current_view {
            View::Overview => {
                self.fetch_machines();
                self.fetch_tasks();
                self.fetch_leaderboard();
            }
            View::Machines | View::Editor => self.fetch_machines(),
            View::Tasks => self.fetch_tasks(),
            View::Leaderboard => self.fetch_leaderboard(),
            View::Analytics => self.fetch_sessions(),
            View::Recipes => self.fetch_recipe_list(),
        }
        self.mark_dirty();
    }

    /// Initial load: everything the overview needs.
    fn initial_load(&mut self) {
        self.fetch_machines();
        self.fetch_tasks();
        self.fetch_leaderboard();
    }

    // ========================================================
    // Event handling
    // ========================================================

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit | AppEvent::ForceQuit => self.should_quit = true,
            AppEvent::SwitchView(view) => self.switch_view(view),
            AppEvent::NextView => self.switch_view(self.current_view.next()),
            AppEvent::PrevView => self.switch_view(self.current_view.prev()),
            AppEvent::ShowHelp => {
                self.show_help = !self.show_help;
                self.mark_dirty();
            }
            AppEvent::Refresh => {
                self.set_status("Refreshing...");
                self.refresh_current();
            }
            AppEvent::Cancel => self.cancel_current(),
            AppEvent::NavigateUp => self.navigate(false),
            AppEvent::NavigateDown => self.navigate(true),
            AppEvent::NavigateLeft => self.navigate_option(false),
            AppEvent::NavigateRight => self.navigate_option(true),
            AppEvent::GoToTop => self.go_to_edge(true),
            AppEvent::GoToBottom => self.go_to_edge(false),
            AppEvent::Select => self.select_current(),
            AppEvent::Toggle => self.toggle_current(),
            AppEvent::TextInput(c) => self.text_input(c),
            AppEvent::Backspace => self.text_backspace(),
            AppEvent::Submit => self.submit_input(),
            AppEvent::FieldNext => self.next_field(),
            AppEvent::Key(c) => self.action_key(c),
            AppEvent::None => {}
        }
    }

    /// Switch to a specific view, lazily fetching its data on first entry.
    pub fn switch_view(&mut self, view: View) {
        if self.current_view == view {
            return;
        }
        self.current_view = view;
        self.input_handler.set_input_mode(false);
        self.mark_dirty();

        match view {
            View::Analytics if self.data.analytics.samples.is_empty() => self.fetch_sessions(),
            View::Recipes if self.data.recipes.options.is_empty() => self.fetch_recipe_list(),
            _ => {}
        }
    }

    fn cancel_current(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else {
            match self.current_view {
                View::Machines => {
                    self.data.machines.form = None;
                    self.data.machines.task_form = None;
                }
                View::Leaderboard => {
                    self.data.leaderboard.drill = None;
                    self.data.leaderboard.expanded = None;
                }
                View::Recipes => self.data.recipes.editing = None,
                View::Editor => self.data.editor.editing = None,
                _ => {}
            }
        }
        self.mark_dirty();
    }

    fn navigate(&mut self, down: bool) {
        match self.current_view {
            View::Machines => self.data.machines.navigate(down),
            View::Tasks => self.data.tasks.navigate(down),
            View::Leaderboard => self.data.leaderboard.navigate(down),
            View::Recipes => {
                let count = self.editable_key_count();
                let cursor = &mut self.data.recipes.field_cursor;
                if down {
                    if *cursor + 1 < count {
                        *cursor += 1;
                    }
                } else if *cursor > 0 {
                    *cursor -= 1;
                }
            }
            View::Editor => {
                let rows = self
                    .data
                    .editor
                    .editor
                    .as_ref()
                    .map(|e| e.rows().len())
                    .unwrap_or(0);
                let cursor = &mut self.data.editor.selected_row;
                if down {
                    if *cursor + 1 < rows {
                        *cursor += 1;
                    }
                } else if *cursor > 0 {
                    *cursor -= 1;
                }
            }
            _ => {}
        }
        self.mark_dirty();
    }

    fn navigate_option(&mut self, right: bool) {
        if self.current_view != View::Recipes || self.data.recipes.options.is_empty() {
            return;
        }
        let len = self.data.recipes.options.len();
        let idx = &mut self.data.recipes.option_idx;
        *idx = if right {
            (*idx + 1) % len
        } else {
            (*idx + len - 1) % len
        };
        self.fetch_recipe_detail();
        self.mark_dirty();
    }

    fn go_to_edge(&mut self, top: bool) {
        match self.current_view {
            View::Machines => {
                let state = &mut self.data.machines;
                state.selected = if top {
                    0
                } else {
                    state.window.visible_len().saturating_sub(1)
                };
            }
            View::Tasks => {
                let state = &mut self.data.tasks;
                state.selected = if top {
                    0
                } else {
                    state.window.visible_len().saturating_sub(1)
                };
            }
            View::Leaderboard => {
                let state = &mut self.data.leaderboard;
                state.selected = if top {
                    0
                } else {
                    state.window.visible_len().saturating_sub(1)
                };
            }
            _ => {}
        }
        self.mark_dirty();
    }

    fn select_current(&mut self) {
        match self.current_view {
            View::Machines => {
                if let Some(machine) = self.data.machines.selected_machine().cloned() {
                    self.data.editor.open(&machine);
                    self.switch_view(View::Editor);
                }
            }
            View::Tasks => self.toggle_current(),
            View::Leaderboard => {
                if let Some(user) = self
                    .data
                    .leaderboard
                    .selected_entry()
                    .map(|r| r.entry.user.clone())
                {
                    self.fetch_user_sessions(user);
                }
            }
            View::Recipes => {
                let keys = self.editable_keys();
                if let Some(key) = keys.get(self.data.recipes.field_cursor) {
                    let current = self.data.recipes.inputs.get(key).cloned().unwrap_or_default();
                    self.data.recipes.editing = Some(current);
                    self.input_handler.set_input_mode(true);
                }
            }
            View::Editor => {
                let row = self.data.editor.selected_row;
                if let Some(editor) = &self.data.editor.editor {
                    if let Some((_, value)) = editor.rows().get(row) {
                        self.data.editor.editing = Some(value.clone());
                        self.input_handler.set_input_mode(true);
                    }
                }
            }
            _ => {}
        }
        self.mark_dirty();
    }

    fn toggle_current(&mut self) {
        match self.current_view {
            View::Machines => {
                let state = &mut self.data.machines;
                state.expanded = if state.expanded == Some(state.selected) {
                    None
                } else {
                    Some(state.selected)
                };
            }
            View::Tasks => {
                let state = &mut self.data.tasks;
                state.expanded = if state.expanded == Some(state.selected) {
                    None
                } else {
                    Some(state.selected)
                };
            }
            View::Leaderboard => {
                let state = &mut self.data.leaderboard;
                state.expanded = if state.expanded == Some(state.selected) {
                    None
                } else {
                    Some(state.selected)
                };
            }
            _ => {}
        }
        self.mark_dirty();
    }

    // ========================================================
    // Text input
    // ========================================================

    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.current_view {
            View::Machines => {
                if let Some(form) = &mut self.data.machines.form {
                    Some(form.active_buffer())
                } else if let Some(form) = &mut self.data.machines.task_form {
                    Some(form.active_buffer())
                } else {
                    None
                }
            }
            View::Tasks => Some(&mut self.data.tasks.filter.search),
            View::Recipes => self.data.recipes.editing.as_mut(),
            View::Editor => self.data.editor.editing.as_mut(),
            _ => None,
        }
    }

    fn text_input(&mut self, c: char) {
        if let Some(buffer) = self.active_buffer() {
            buffer.push(c);
            if self.current_view == View::Tasks {
                // Live search: re-filter on every keystroke
                self.data.tasks.refilter();
            }
            self.mark_dirty();
        }
    }

    fn text_backspace(&mut self) {
        if let Some(buffer) = self.active_buffer() {
            buffer.pop();
            if self.current_view == View::Tasks {
                self.data.tasks.refilter();
            }
            self.mark_dirty();
        }
    }

    fn next_field(&mut self) {
        if let Some(form) = &mut self.data.machines.form {
            form.next_field();
        } else if let Some(form) = &mut self.data.machines.task_form {
            form.next_field();
        }
        self.mark_dirty();
    }

    fn submit_input(&mut self) {
        self.input_handler.set_input_mode(false);
        match self.current_view {
            View::Machines => {
                if self.data.machines.form.is_some() {
                    self.submit_machine_form();
                } else if self.data.machines.task_form.is_some() {
                    self.submit_task_form();
                }
            }
            View::Tasks => {
                // Search stays applied; Enter just leaves input mode
            }
            View::Recipes => {
                let keys = self.editable_keys();
                if let (Some(buffer), Some(key)) = (
                    self.data.recipes.editing.take(),
                    keys.get(self.data.recipes.field_cursor),
                ) {
                    self.data.recipes.inputs.insert(key.clone(), buffer);
                }
            }
            View::Editor => self.submit_payload_edit(),
            _ => {}
        }
        self.mark_dirty();
    }

    fn submit_machine_form(&mut self) {
        let Some(form) = self.data.machines.form.take() else {
            return;
        };
        let mut machine = Machine::new(form.ip.trim(), form.alias.trim());

        if form.editing {
            // Keep the existing payload; only the alias changes
            if let Some(existing) = self
                .data
                .machines
                .window
                .items()
                .iter()
                .find(|m| m.ip == machine.ip)
            {
                machine.task = existing.task.clone();
                machine.wakeup_payload = existing.wakeup_payload.clone();
            }
        }

        if let Err(e) = lifecycle::validate_machine(&machine) {
            self.data.machines.form = Some(form);
            self.input_handler.set_input_mode(true);
            self.set_status(e.to_string());
            return;
        }

        // Optimistic upsert by IP
        let items = self.data.machines.window.items_mut();
        match items.iter().position(|m| m.ip == machine.ip) {
            Some(idx) => items[idx] = machine.clone(),
            None => items.push(machine.clone()),
        }

        let client = self.client.clone();
        let label = if form.editing {
            "edit machine"
        } else {
            "add machine"
        };
        self.spawn_mutation(label, async move { client.add_machine(&machine).await });
        self.set_status(format!("{label}: sent"));
    }

    fn submit_task_form(&mut self) {
        let Some(form) = self.data.machines.task_form.take() else {
            return;
        };
        self.apply_task_action(TaskAction::Start {
            name: form.name.trim().to_string(),
            notes: form.notes.trim().to_string(),
        });
    }

    fn submit_payload_edit(&mut self) {
        let Some(buffer) = self.data.editor.editing.take() else {
            return;
        };
        let Some(pointer) = self.data.editor.selected_pointer() else {
            return;
        };
        // Numbers, booleans, and null parse as themselves; anything else
        // becomes a string
        let value: Value =
            serde_json::from_str(&buffer).unwrap_or_else(|_| Value::String(buffer.clone()));
        if let Some(editor) = &mut self.data.editor.editor {
            if let Err(e) = editor.set(&pointer, value) {
                self.data.editor.error = Some(e.to_string());
            } else {
                self.data.editor.error = None;
            }
        }
    }

    // ========================================================
    // View-specific actions
    // ========================================================

    fn action_key(&mut self, c: char) {
        match self.current_view {
            View::Machines => self.machines_action(c),
            View::Tasks => self.tasks_action(c),
            View::Leaderboard => {
                if c == 's' {
                    self.data.leaderboard.sort = self.data.leaderboard.sort.toggled();
                    self.data.leaderboard.rerank();
                    self.mark_dirty();
                }
            }
            View::Recipes => {
                if c == 'c' {
                    self.compute_recipe();
                }
            }
            View::Editor => self.editor_action(c),
            _ => {}
        }
    }

    fn machines_action(&mut self, c: char) {
        match c {
            'n' => {
                self.data.machines.form = Some(MachineForm::default());
                self.input_handler.set_input_mode(true);
            }
            'e' => {
                if let Some(machine) = self.data.machines.selected_machine() {
                    self.data.machines.form = Some(MachineForm::edit(machine));
                    self.input_handler.set_input_mode(true);
                }
            }
            'd' => self.remove_selected_machine(),
            's' => {
                match self.data.machines.selected_machine().map(|m| m.task_status()) {
                    Some(TaskStatus::Idle) => {
                        self.data.machines.task_form = Some(TaskForm::default());
                        self.input_handler.set_input_mode(true);
                    }
                    Some(status) => {
                        self.set_status(format!("Machine already has a {status} task"));
                    }
                    None => {}
                }
            }
            'p' => {
                match self.data.machines.selected_machine().map(|m| m.task_status()) {
                    Some(TaskStatus::Running) => self.apply_task_action(TaskAction::Pause),
                    Some(TaskStatus::Paused) => self.apply_task_action(TaskAction::Resume),
                    _ => self.set_status("No task to pause or resume"),
                }
            }
            'x' => self.apply_task_action(TaskAction::Kill),
            _ => {}
        }
        self.mark_dirty();
    }

    fn tasks_action(&mut self, c: char) {
        match c {
            '/' => self.input_handler.set_input_mode(true),
            'f' => self.data.tasks.cycle_status_filter(),
            'c' => {
                self.data.tasks.filter.hide_completed = !self.data.tasks.filter.hide_completed;
                self.data.tasks.refilter();
            }
            's' => {
                self.data.tasks.sort = self.data.tasks.sort.next();
                self.data.tasks.refilter();
            }
            _ => {}
        }
        self.mark_dirty();
    }

    fn editor_action(&mut self, c: char) {
        match c {
            's' => self.save_payload(),
            'u' => {
                if let Some(editor) = &mut self.data.editor.editor {
                    editor.revert();
                    self.set_status("Payload reverted");
                }
            }
            _ => {}
        }
        self.mark_dirty();
    }

    fn apply_task_action(&mut self, action: TaskAction) {
        let Some(machine) = self.data.machines.selected_machine_mut() else {
            return;
        };
        match lifecycle::apply(machine, action) {
            Ok(update) => {
                let client = self.client.clone();
                let label = format!("task {}", update.status);
                self.spawn_mutation(&label, async move {
                    client.send_task_update(&update).await
                });
                self.set_status(label);
            }
            Err(e) => {
                let guidance = e.guidance().map(|g| format!(" ({g})")).unwrap_or_default();
                self.set_status(format!("{e}{guidance}"));
            }
        }
        self.mark_dirty();
    }

    fn remove_selected_machine(&mut self) {
        let Some(machine) = self.data.machines.selected_machine().cloned() else {
            return;
        };
        if let Err(e) = lifecycle::ensure_removable(&machine) {
            let guidance = e.guidance().map(|g| format!(" ({g})")).unwrap_or_default();
            self.set_status(format!("{e}{guidance}"));
            return;
        }

        let items = self.data.machines.window.items_mut();
        items.retain(|m| m.ip != machine.ip);
        let visible = self.data.machines.window.visible_len();
        if self.data.machines.selected >= visible && visible > 0 {
            self.data.machines.selected = visible - 1;
        }

        let client = self.client.clone();
        let ip = machine.ip.clone();
        self.spawn_mutation("remove machine", async move {
            client.remove_machine(&ip).await
        });
        self.set_status(format!("Removed {}", machine.display_name()));
    }

    fn save_payload(&mut self) {
        let Some(ip) = self.data.editor.machine_ip.clone() else {
            return;
        };
        let Some(editor) = &mut self.data.editor.editor else {
            return;
        };
        if !editor.is_dirty() {
            self.set_status("No changes to save");
            return;
        }
        let payload = editor.working().clone();
        editor.mark_saved();

        // Mirror into the machine list so a re-open shows the saved state
        let Some(idx) = self
            .data
            .machines
            .window
            .items()
            .iter()
            .position(|m| m.ip == ip)
        else {
            self.data.editor.error = Some(format!("machine {ip} no longer exists"));
            return;
        };
        let machine = &mut self.data.machines.window.items_mut()[idx];
        machine.wakeup_payload = Some(payload.clone());
        let machine = machine.clone();

        self.data.editor.saving = true;
        let client = self.client.clone();
        self.spawn_mutation("save payload", async move {
            client.update_wakeup_payload(&machine, &payload).await
        });
        self.set_status(format!("Payload for {ip} sent"));
    }

    fn editable_keys(&self) -> Vec<String> {
        let controlling = self.controlling_inputs();
        self.data.recipes.editable_keys(&controlling)
    }

    fn editable_key_count(&self) -> usize {
        self.editable_keys().len()
    }

    /// Controlling-inputs list for the currently loaded recipe.
    fn controlling_inputs(&self) -> Vec<String> {
        self.data
            .recipes
            .recipe
            .as_ref()
            .and_then(|r| self.config.controlling_inputs.get(&r.name).cloned())
            .unwrap_or_default()
    }

    // ========================================================
    // Run loop
    // ========================================================

    /// Run the main application loop.
    pub fn run(&mut self) -> AppResult<()> {
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        info!("dashboard started");
        self.initial_load();

        let result = self.run_loop(&mut terminal);

        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> AppResult<()> {
        while !self.should_quit {
            if self.drain_outcomes() {
                self.mark_dirty();
            }

            // Expire stale status messages
            if self.data.status_message.is_some() && self.status_set_at.elapsed() >= STATUS_TTL {
                self.data.status_message = None;
                self.mark_dirty();
            }

            if self.dirty {
                self.dirty = false;
                terminal.draw(|frame| self.draw(frame))?;
            }

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }
        }
        Ok(())
    }

    /// Land every completed fetch waiting on the channel.
    fn drain_outcomes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            let list_landed = matches!(&outcome, FetchOutcome::RecipeList(tag, Ok(_))
                if self.data.recipes.list_generation.is_current(*tag));
            let payload_saved = matches!(&outcome,
                FetchOutcome::Mutation(label, result) if label == "save payload" && result.is_ok());
            if let FetchOutcome::Mutation(label, _) = &outcome {
                if label == "save payload" {
                    self.data.editor.saving = false;
                }
            }
            changed |= self.data.apply(outcome);
            if list_landed {
                // The list alone is not enough; load the selected recipe
                self.fetch_recipe_detail();
            }
            if payload_saved {
                // Refetch so the list reflects what the backend actually stored
                self.fetch_machines();
            }
        }
        changed
    }

    // ========================================================
    // Drawing
    // ========================================================

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Content
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_content(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            self.draw_help_overlay(frame, area);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let mut spans = vec![Span::styled(
            " BuildShift ".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )];
        for view in View::ALL {
            let style = if view == self.current_view {
                Style::default().fg(theme.hotkey).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_dim)
            };
            spans.push(Span::styled(format!(" {} ", view.hotkey_hint()), style));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_dim));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn draw_content(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        match self.current_view {
            View::Overview => {
                frame.render_widget(OverviewPanel::new(&self.data, theme), area);
            }
            View::Machines => {
                frame.render_widget(MachinesPanel::new(&self.data.machines, theme), area);
            }
            View::Tasks => {
                let search_active =
                    self.input_handler.is_input_mode() && self.data.machines.form.is_none();
                frame.render_widget(
                    TasksPanel::new(&self.data.tasks, theme).search_active(search_active),
                    area,
                );
            }
            View::Leaderboard => {
                frame.render_widget(LeaderboardPanel::new(&self.data.leaderboard, theme), area);
            }
            View::Analytics => {
                frame.render_widget(AnalyticsPanel::new(&self.data.analytics, theme), area);
            }
            View::Recipes => {
                let controlling = self.controlling_inputs();
                frame.render_widget(
                    RecipesPanel::new(&self.data.recipes, theme, &controlling),
                    area,
                );
            }
            View::Editor => {
                frame.render_widget(EditorPanel::new(&self.data.editor, theme), area);
            }
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let line = match &self.data.status_message {
            Some(message) => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(theme.status_warning),
            )),
            None => Line::from(Span::styled(
                " [?] help  [r] refresh  [Tab] next view  [q] quit",
                Style::default().fg(theme.text_dim),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let width = area.width.min(64);
        let height = area.height.min(20);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        let text = vec![
            Line::from(Span::styled(
                "Keys",
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            )),
            Line::from("  1-7 / Tab     switch view"),
            Line::from("  Up/Down j/k   move / load more"),
            Line::from("  Space         expand details"),
            Line::from("  Enter         open / edit"),
            Line::from("  r             refresh view"),
            Line::from(""),
            Line::from("Machines: [n]ew [e]dit [d]elete [s]tart [p]ause/resume [x] kill"),
            Line::from("Tasks: [/] search [f] status filter [c] hide done [s] sort"),
            Line::from("Leaderboard: [s] sort toggle, Enter for user sessions"),
            Line::from("Recipes: Left/Right recipe, Enter edit input, [c] compute"),
            Line::from("Payload: Enter edit value, [s] save, [u] revert"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc to close",
                Style::default().fg(theme.text_dim),
            )),
        ];

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.header));
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }).block(block), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildshift_core::types::Task;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn seed_machines(app: &mut App, machines: Vec<Machine>) {
        let tag = app.data.machines.generation.begin();
        app.data.machines.apply_fetch(tag, Ok(machines));
    }

    #[test]
    fn test_view_switching_events() {
        let mut app = app();
        app.handle_app_event(AppEvent::SwitchView(View::Machines));
        assert_eq!(app.current_view(), View::Machines);

        app.handle_app_event(AppEvent::NextView);
        assert_eq!(app.current_view(), View::Tasks);

        app.handle_app_event(AppEvent::PrevView);
        assert_eq!(app.current_view(), View::Machines);
    }

    #[test]
    fn test_quit_event() {
        let mut app = app();
        assert!(!app.should_quit());
        app.handle_app_event(AppEvent::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_removal_guard_blocks_busy_machine() {
        let mut app = app();
        let mut busy = Machine::new("10.0.0.12", "counter-a");
        busy.task = Some(Task::running("batch-7", ""));
        seed_machines(&mut app, vec![busy]);
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('d'));

        // Machine stays; status line explains why
        assert_eq!(app.data.machines.window.items().len(), 1);
        let status = app.data.status_message.clone().unwrap();
        assert!(status.contains("running"));
    }

    #[test]
    fn test_removal_of_idle_machine_is_local_first() {
        let mut app = app();
        seed_machines(&mut app, vec![Machine::new("10.0.0.12", "counter-a")]);
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('d'));
        assert!(app.data.machines.window.items().is_empty());
    }

    #[test]
    fn test_pause_resume_toggle() {
        let mut app = app();
        let mut busy = Machine::new("10.0.0.12", "counter-a");
        busy.task = Some(Task::running("batch-7", ""));
        seed_machines(&mut app, vec![busy]);
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('p'));
        assert_eq!(
            app.data.machines.window.items()[0].task_status(),
            TaskStatus::Paused
        );

        app.handle_app_event(AppEvent::Key('p'));
        assert_eq!(
            app.data.machines.window.items()[0].task_status(),
            TaskStatus::Running
        );
    }

    #[test]
    fn test_kill_returns_machine_to_idle() {
        let mut app = app();
        let mut busy = Machine::new("10.0.0.12", "counter-a");
        busy.task = Some(Task::running("batch-7", ""));
        seed_machines(&mut app, vec![busy]);
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('x'));
        let machine = &app.data.machines.window.items()[0];
        assert_eq!(machine.task_status(), TaskStatus::Idle);
        assert!(machine.task.is_none());
    }

    #[test]
    fn test_machine_form_submit_upserts() {
        let mut app = app();
        seed_machines(&mut app, Vec::new());
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('n'));
        assert!(app.input_handler.is_input_mode());

        for c in "counter-a".chars() {
            app.handle_app_event(AppEvent::TextInput(c));
        }
        app.handle_app_event(AppEvent::FieldNext);
        for c in "10.0.0.12".chars() {
            app.handle_app_event(AppEvent::TextInput(c));
        }
        app.handle_app_event(AppEvent::Submit);

        let items = app.data.machines.window.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].alias, "counter-a");
        assert_eq!(items[0].ip, "10.0.0.12");
    }

    #[test]
    fn test_invalid_machine_form_keeps_form_open() {
        let mut app = app();
        seed_machines(&mut app, Vec::new());
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Key('n'));
        // Alias only, no IP
        app.handle_app_event(AppEvent::TextInput('a'));
        app.handle_app_event(AppEvent::Submit);

        assert!(app.data.machines.form.is_some());
        assert!(app.data.machines.window.items().is_empty());
    }

    #[test]
    fn test_enter_opens_payload_editor() {
        let mut app = app();
        let mut machine = Machine::new("10.0.0.12", "px-101");
        machine.wakeup_payload = Some(serde_json::json!({ "interval_secs": 30 }));
        seed_machines(&mut app, vec![machine]);
        app.switch_view(View::Machines);

        app.handle_app_event(AppEvent::Select);
        assert_eq!(app.current_view(), View::Editor);
        assert!(app.data.editor.editor.is_some());
    }

    #[test]
    fn test_payload_edit_and_save_mirrors_to_machine() {
        let mut app = app();
        let mut machine = Machine::new("10.0.0.12", "px-101");
        machine.wakeup_payload = Some(serde_json::json!({ "interval_secs": 30 }));
        seed_machines(&mut app, vec![machine]);
        app.switch_view(View::Machines);
        app.handle_app_event(AppEvent::Select);

        // Edit the value to 60
        app.handle_app_event(AppEvent::Select);
        app.data.editor.editing = Some("60".to_string());
        app.handle_app_event(AppEvent::Submit);
        assert!(app.data.editor.editor.as_ref().unwrap().is_dirty());

        app.handle_app_event(AppEvent::Key('s'));
        assert!(!app.data.editor.editor.as_ref().unwrap().is_dirty());
        assert_eq!(
            app.data.machines.window.items()[0].wakeup_payload,
            Some(serde_json::json!({ "interval_secs": 60 }))
        );
    }

    #[test]
    fn test_leaderboard_sort_toggle_action() {
        let mut app = app();
        let tag = app.data.leaderboard.generation.begin();
        app.data.leaderboard.apply_fetch(
            tag,
            Ok(vec![
                buildshift_core::types::LeaderboardEntry {
                    id: None,
                    user: "slow".into(),
                    count: 10.0,
                    duration_secs: 100.0,
                    start: None,
                    end: None,
                    notes: String::new(),
                },
                buildshift_core::types::LeaderboardEntry {
                    id: None,
                    user: "big".into(),
                    count: 100.0,
                    duration_secs: 0.0,
                    start: None,
                    end: None,
                    notes: String::new(),
                },
            ]),
        );
        app.switch_view(View::Leaderboard);

        assert_eq!(app.data.leaderboard.window.visible()[0].entry.user, "slow");
        app.handle_app_event(AppEvent::Key('s'));
        assert_eq!(app.data.leaderboard.window.visible()[0].entry.user, "big");
    }

    #[test]
    fn test_task_search_refilters_live() {
        let mut app = app();
        let tag = app.data.tasks.generation.begin();
        app.data
            .tasks
            .apply_fetch(tag, Ok(crate::data::placeholder_tasks()));
        app.switch_view(View::Tasks);

        app.handle_app_event(AppEvent::Key('/'));
        for c in "hopper".chars() {
            app.handle_app_event(AppEvent::TextInput(c));
        }
        assert_eq!(app.data.tasks.window.len(), 1);

        app.handle_app_event(AppEvent::Submit);
        assert_eq!(app.data.tasks.filter.search, "hopper");
    }
}
