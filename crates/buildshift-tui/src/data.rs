//! Dashboard state: per-view data, fetch sequencing, placeholder fallbacks.
//!
//! Every remote fetch is tagged with a per-resource generation number taken
//! when the request is issued. A response only lands if its tag still matches
//! the resource's current generation, so the most recently issued request
//! always wins regardless of arrival order. Stale responses are dropped.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use buildshift_core::error::BuildShiftError;
use buildshift_core::types::{
    LeaderboardEntry, Machine, NotionTask, Person, SessionSample, TaskStatus,
};
use buildshift_data::filter::{self, SortMode, TaskFilter};
use buildshift_data::payload::PayloadEditor;
use buildshift_data::rate::{rank_entries, LeaderboardSort, RankedEntry};
use buildshift_data::recipe::{FieldKind, Recipe, RecipeOption};
use buildshift_data::window::PageWindow;

// ============================================================
// Fetch sequencing
// ============================================================

/// Monotonic request counter for one resource.
#[derive(Debug, Default)]
pub struct Generation {
    issued: u64,
}

impl Generation {
    /// Tag a new request, superseding every earlier one.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a response tag is still the latest request.
    pub fn is_current(&self, tag: u64) -> bool {
        tag == self.issued
    }
}

/// A completed fetch or mutation, tagged with its issuing generation.
#[derive(Debug)]
pub enum FetchOutcome {
    Machines(u64, Result<Vec<Machine>, BuildShiftError>),
    Tasks(u64, Result<Vec<NotionTask>, BuildShiftError>),
    Leaderboard(u64, Result<Vec<LeaderboardEntry>, BuildShiftError>),
    Sessions(u64, Result<Vec<SessionSample>, BuildShiftError>),
    UserSessions(u64, String, Result<Vec<SessionSample>, BuildShiftError>),
    RecipeList(u64, Result<Vec<RecipeOption>, BuildShiftError>),
    RecipeDetail(u64, Result<Recipe, BuildShiftError>),
    RecipeComputed(u64, Result<Value, BuildShiftError>),
    /// Acknowledgement for a fire-and-forget mutation, labelled for the
    /// status line. Failures are reported but never rolled back.
    Mutation(String, Result<(), BuildShiftError>),
}

// ============================================================
// Forms
// ============================================================

/// Which field of the machine form has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MachineFormField {
    #[default]
    Alias,
    Ip,
}

/// Add/edit machine form.
#[derive(Debug, Clone, Default)]
pub struct MachineForm {
    pub alias: String,
    pub ip: String,
    pub field: MachineFormField,
    /// Editing an existing machine: the IP is fixed and re-posted as-is
    pub editing: bool,
}

impl MachineForm {
    /// Prefill from an existing machine for an alias edit.
    pub fn edit(machine: &Machine) -> Self {
        Self {
            alias: machine.alias.clone(),
            ip: machine.ip.clone(),
            field: MachineFormField::Alias,
            editing: true,
        }
    }

    /// The field currently receiving text.
    pub fn active_buffer(&mut self) -> &mut String {
        match self.field {
            MachineFormField::Alias => &mut self.alias,
            MachineFormField::Ip => &mut self.ip,
        }
    }

    /// Move the cursor to the other field. Editing an existing machine
    /// keeps the cursor on the alias, the IP is its identity.
    pub fn next_field(&mut self) {
        if self.editing {
            return;
        }
        self.field = match self.field {
            MachineFormField::Alias => MachineFormField::Ip,
            MachineFormField::Ip => MachineFormField::Alias,
        };
    }
}

/// Which field of the start-task form has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFormField {
    #[default]
    Name,
    Notes,
}

/// Start-task form for an idle machine.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub name: String,
    pub notes: String,
    pub field: TaskFormField,
}

impl TaskForm {
    /// The field currently receiving text.
    pub fn active_buffer(&mut self) -> &mut String {
        match self.field {
            TaskFormField::Name => &mut self.name,
            TaskFormField::Notes => &mut self.notes,
        }
    }

    /// Move the cursor to the other field.
    pub fn next_field(&mut self) {
        self.field = match self.field {
            TaskFormField::Name => TaskFormField::Notes,
            TaskFormField::Notes => TaskFormField::Name,
        };
    }
}

// ============================================================
// Per-view state
// ============================================================

/// Machine list state.
#[derive(Debug, Default)]
pub struct MachinesState {
    pub window: PageWindow<Machine>,
    pub selected: usize,
    /// Row with its notes expanded, if any
    pub expanded: Option<usize>,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: Generation,
    pub form: Option<MachineForm>,
    pub task_form: Option<TaskForm>,
}

impl MachinesState {
    /// Land a fetch result, ignoring stale generations.
    pub fn apply_fetch(&mut self, tag: u64, result: Result<Vec<Machine>, BuildShiftError>) -> bool {
        if !self.generation.is_current(tag) {
            debug!(tag, "dropping stale machine fetch");
            return false;
        }
        self.loading = false;
        match result {
            Ok(machines) => {
                self.error = None;
                self.window.set_items(machines);
                self.clamp_selection();
            }
            Err(e) => {
                warn!(error = %e, "machine fetch failed");
                self.error = Some(e.to_string());
                self.window.set_items(Vec::new());
                self.selected = 0;
                self.expanded = None;
            }
        }
        true
    }

    /// The machine under the cursor, if any.
    pub fn selected_machine(&self) -> Option<&Machine> {
        self.window.visible().get(self.selected)
    }

    pub fn selected_machine_mut(&mut self) -> Option<&mut Machine> {
        if self.selected < self.window.visible_len() {
            self.window.items_mut().get_mut(self.selected)
        } else {
            None
        }
    }

    /// Move the cursor, growing the window when it hits the bottom.
    pub fn navigate(&mut self, down: bool) {
        navigate_window(&mut self.window, &mut self.selected, down);
        self.expanded = None;
    }

    fn clamp_selection(&mut self) {
        if self.window.visible_len() == 0 {
            self.selected = 0;
        } else if self.selected >= self.window.visible_len() {
            self.selected = self.window.visible_len() - 1;
        }
        self.expanded = None;
    }

    /// Counts of (idle, running, paused) machines for the overview.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for machine in self.window.items() {
            match machine.task_status() {
                TaskStatus::Idle => counts.0 += 1,
                TaskStatus::Running => counts.1 += 1,
                TaskStatus::Paused => counts.2 += 1,
            }
        }
        counts
    }
}

/// Notion task board state.
#[derive(Debug, Default)]
pub struct TasksState {
    /// Full fetched set; the window holds the filtered/sorted view
    pub all: Vec<NotionTask>,
    pub window: PageWindow<NotionTask>,
    pub filter: TaskFilter,
    pub sort: SortMode,
    pub selected: usize,
    pub expanded: Option<usize>,
    pub loading: bool,
    pub error: Option<String>,
    /// Showing the placeholder board after a failed fetch
    pub placeholder: bool,
    pub generation: Generation,
}

impl TasksState {
    /// Land a fetch result, falling back to the placeholder board on error.
    pub fn apply_fetch(
        &mut self,
        tag: u64,
        result: Result<Vec<NotionTask>, BuildShiftError>,
    ) -> bool {
        if !self.generation.is_current(tag) {
            debug!(tag, "dropping stale task fetch");
            return false;
        }
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.error = None;
                self.placeholder = false;
                self.all = tasks;
            }
            Err(e) => {
                warn!(error = %e, "task board fetch failed, showing placeholder board");
                self.error = Some(e.to_string());
                self.placeholder = true;
                self.all = placeholder_tasks();
            }
        }
        self.refilter();
        true
    }

    /// Re-run filter and sort over the full set; resets to the first page.
    pub fn refilter(&mut self) {
        self.window
            .set_items(filter::apply(&self.all, &self.filter, self.sort));
        self.selected = 0;
        self.expanded = None;
    }

    /// The task under the cursor, if any.
    pub fn selected_task(&self) -> Option<&NotionTask> {
        self.window.visible().get(self.selected)
    }

    /// Move the cursor, growing the window when it hits the bottom.
    pub fn navigate(&mut self, down: bool) {
        navigate_window(&mut self.window, &mut self.selected, down);
        self.expanded = None;
    }

    /// Distinct status names in board order, for the status filter cycle.
    pub fn status_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for task in &self.all {
            if !names.contains(&task.status) {
                names.push(task.status.clone());
            }
        }
        names
    }

    /// Cycle the status filter: none -> each distinct status -> none.
    pub fn cycle_status_filter(&mut self) {
        let names = self.status_names();
        self.filter.status = match &self.filter.status {
            None => names.first().cloned(),
            Some(current) => {
                let idx = names.iter().position(|n| n == current);
                match idx {
                    Some(i) if i + 1 < names.len() => Some(names[i + 1].clone()),
                    _ => None,
                }
            }
        };
        self.refilter();
    }
}

/// Per-user drill-down below the leaderboard.
#[derive(Debug)]
pub struct DrillDown {
    pub user: String,
    pub samples: Vec<SessionSample>,
    pub loading: bool,
}

/// Leaderboard state.
#[derive(Debug, Default)]
pub struct LeaderboardState {
    /// Entries as fetched; the window holds the ranked view
    pub all: Vec<LeaderboardEntry>,
    pub window: PageWindow<RankedEntry>,
    pub sort: LeaderboardSort,
    pub selected: usize,
    pub expanded: Option<usize>,
    pub loading: bool,
    pub error: Option<String>,
    /// Showing the sample leaderboard after a failed fetch
    pub placeholder: bool,
    pub generation: Generation,
    pub drill: Option<DrillDown>,
    pub drill_generation: Generation,
}

impl LeaderboardState {
    /// Land a fetch result, ignoring stale generations.
    pub fn apply_fetch(
        &mut self,
        tag: u64,
        result: Result<Vec<LeaderboardEntry>, BuildShiftError>,
    ) -> bool {
        if !self.generation.is_current(tag) {
            debug!(tag, "dropping stale leaderboard fetch");
            return false;
        }
        self.loading = false;
        match result {
            Ok(entries) => {
                self.error = None;
                self.placeholder = false;
                self.all = entries;
            }
            Err(e) => {
                warn!(error = %e, "leaderboard fetch failed, showing sample data");
                self.error = Some(e.to_string());
                self.placeholder = true;
                self.all = placeholder_entries();
            }
        }
        self.rerank();
        true
    }

    /// Land a drill-down fetch for one user.
    pub fn apply_drill(
        &mut self,
        tag: u64,
        user: String,
        result: Result<Vec<SessionSample>, BuildShiftError>,
    ) -> bool {
        if !self.drill_generation.is_current(tag) {
            debug!(tag, user, "dropping stale drill-down fetch");
            return false;
        }
        match result {
            Ok(samples) => {
                self.drill = Some(DrillDown {
                    user,
                    samples,
                    loading: false,
                });
            }
            Err(e) => {
                warn!(error = %e, user, "drill-down fetch failed");
                self.error = Some(e.to_string());
                self.drill = None;
            }
        }
        true
    }

    /// Recompute rates and ordering; resets to the first page.
    pub fn rerank(&mut self) {
        self.window.set_items(rank_entries(self.all.clone(), self.sort));
        self.selected = 0;
        self.expanded = None;
    }

    /// The entry under the cursor, if any.
    pub fn selected_entry(&self) -> Option<&RankedEntry> {
        self.window.visible().get(self.selected)
    }

    /// Move the cursor, growing the window when it hits the bottom.
    pub fn navigate(&mut self, down: bool) {
        navigate_window(&mut self.window, &mut self.selected, down);
    }
}

/// Analytics chart state.
#[derive(Debug, Default)]
pub struct AnalyticsState {
    pub samples: Vec<SessionSample>,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: Generation,
}

impl AnalyticsState {
    /// Land a fetch result, ignoring stale generations.
    pub fn apply_fetch(
        &mut self,
        tag: u64,
        result: Result<Vec<SessionSample>, BuildShiftError>,
    ) -> bool {
        if !self.generation.is_current(tag) {
            debug!(tag, "dropping stale analytics fetch");
            return false;
        }
        self.loading = false;
        match result {
            Ok(samples) => {
                self.error = None;
                self.samples = samples;
            }
            Err(e) => {
                warn!(error = %e, "analytics fetch failed");
                self.error = Some(e.to_string());
                self.samples = Vec::new();
            }
        }
        true
    }
}

/// Recipe calculator state.
#[derive(Debug, Default)]
pub struct RecipesState {
    pub options: Vec<RecipeOption>,
    /// Index into `options` of the selected recipe
    pub option_idx: usize,
    pub recipe: Option<Recipe>,
    /// Current values for editable fields, keyed by field name
    pub inputs: HashMap<String, String>,
    /// Last computed field map from the backend
    pub computed: Option<Value>,
    /// Cursor over the editable fields
    pub field_cursor: usize,
    /// Buffer for the field being edited, if any
    pub editing: Option<String>,
    pub list_loading: bool,
    pub detail_loading: bool,
    pub computing: bool,
    pub error: Option<String>,
    pub list_generation: Generation,
    pub detail_generation: Generation,
    pub compute_generation: Generation,
}

impl RecipesState {
    /// Land the recipe list.
    pub fn apply_list(
        &mut self,
        tag: u64,
        result: Result<Vec<RecipeOption>, BuildShiftError>,
    ) -> bool {
        if !self.list_generation.is_current(tag) {
            return false;
        }
        self.list_loading = false;
        match result {
            Ok(options) => {
                self.error = None;
                self.options = options;
                self.option_idx = 0;
            }
            Err(e) => {
                warn!(error = %e, "recipe list fetch failed");
                self.error = Some("Failed to load recipes.".to_string());
                self.options = Vec::new();
            }
        }
        true
    }

    /// Land one recipe's fields, resetting inputs and computed values.
    pub fn apply_detail(&mut self, tag: u64, result: Result<Recipe, BuildShiftError>) -> bool {
        if !self.detail_generation.is_current(tag) {
            debug!(tag, "dropping stale recipe detail");
            return false;
        }
        self.detail_loading = false;
        match result {
            Ok(recipe) => {
                self.error = None;
                self.inputs.clear();
                self.computed = None;
                self.field_cursor = 0;
                self.editing = None;
                self.recipe = Some(recipe);
            }
            Err(e) => {
                warn!(error = %e, "recipe fetch failed");
                self.error = Some("Failed to load recipe details.".to_string());
                self.recipe = None;
            }
        }
        true
    }

    /// Land a computation result.
    pub fn apply_computed(&mut self, tag: u64, result: Result<Value, BuildShiftError>) -> bool {
        if !self.compute_generation.is_current(tag) {
            return false;
        }
        self.computing = false;
        match result {
            Ok(values) => {
                self.error = None;
                self.computed = Some(values);
            }
            Err(e) => {
                warn!(error = %e, "recipe computation failed");
                self.error = Some("Failed to compute recipe.".to_string());
            }
        }
        true
    }

    /// The selected recipe option, if any.
    pub fn selected_option(&self) -> Option<&RecipeOption> {
        self.options.get(self.option_idx)
    }

    /// Editable field keys under the controlling-inputs list.
    pub fn editable_keys(&self, controlling: &[String]) -> Vec<String> {
        match &self.recipe {
            Some(recipe) => recipe
                .partition(controlling)
                .0
                .iter()
                .map(|f| f.key.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The computed (or fetched) display value for a dependent field.
    pub fn display_value(&self, key: &str, kind: FieldKind) -> String {
        if let Some(computed) = &self.computed {
            match &computed[key] {
                Value::Null => {}
                Value::String(s) => return s.clone(),
                other => return other.to_string(),
            }
        }
        match kind {
            FieldKind::Number => "-".to_string(),
            FieldKind::Date => "----------".to_string(),
        }
    }
}

/// Wakeup-payload editor state, targeting one machine at a time.
#[derive(Debug, Default)]
pub struct EditorState {
    /// IP of the machine whose payload is open
    pub machine_ip: Option<String>,
    pub editor: Option<PayloadEditor>,
    pub selected_row: usize,
    /// Buffer for the value being edited, if any
    pub editing: Option<String>,
    pub saving: bool,
    pub error: Option<String>,
}

impl EditorState {
    /// Open the payload of a machine.
    pub fn open(&mut self, machine: &Machine) {
        match PayloadEditor::load(machine) {
            Ok(editor) => {
                self.machine_ip = Some(machine.ip.clone());
                self.editor = Some(editor);
                self.selected_row = 0;
                self.editing = None;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, ip = %machine.ip, "failed to open wakeup payload");
                self.machine_ip = None;
                self.editor = None;
                self.error = Some(e.to_string());
            }
        }
        self.saving = false;
    }

    /// The pointer of the row under the cursor, if any.
    pub fn selected_pointer(&self) -> Option<String> {
        self.editor
            .as_ref()
            .and_then(|e| e.rows().get(self.selected_row).map(|(p, _)| p.clone()))
    }
}

// ============================================================
// Aggregate
// ============================================================

/// All per-view state, plus the transient status line.
#[derive(Debug, Default)]
pub struct DashboardData {
    pub machines: MachinesState,
    pub tasks: TasksState,
    pub leaderboard: LeaderboardState,
    pub analytics: AnalyticsState,
    pub recipes: RecipesState,
    pub editor: EditorState,
    pub status_message: Option<String>,
}

impl DashboardData {
    /// Route a completed fetch to its view state.
    ///
    /// Returns true if any state changed (the UI needs a redraw).
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Machines(tag, result) => self.machines.apply_fetch(tag, result),
            FetchOutcome::Tasks(tag, result) => self.tasks.apply_fetch(tag, result),
            FetchOutcome::Leaderboard(tag, result) => self.leaderboard.apply_fetch(tag, result),
            FetchOutcome::Sessions(tag, result) => self.analytics.apply_fetch(tag, result),
            FetchOutcome::UserSessions(tag, user, result) => {
                self.leaderboard.apply_drill(tag, user, result)
            }
            FetchOutcome::RecipeList(tag, result) => self.recipes.apply_list(tag, result),
            FetchOutcome::RecipeDetail(tag, result) => self.recipes.apply_detail(tag, result),
            FetchOutcome::RecipeComputed(tag, result) => self.recipes.apply_computed(tag, result),
            FetchOutcome::Mutation(label, result) => {
                match result {
                    Ok(()) => {
                        self.status_message = Some(format!("{label}: ok"));
                    }
                    Err(e) => {
                        // Local state was already applied; report, never roll back
                        warn!(error = %e, label, "mutation failed");
                        self.status_message = Some(format!("{label} failed: {e}"));
                    }
                }
                true
            }
        }
    }
}

/// Cursor movement over a paged window: moving past the last visible row
/// pulls in the next page, the infinite-scroll trigger.
fn navigate_window<T>(window: &mut PageWindow<T>, selected: &mut usize, down: bool) {
    if down {
        if *selected + 1 < window.visible_len() {
            *selected += 1;
        } else if window.load_more() {
            *selected += 1;
        }
    } else if *selected > 0 {
        *selected -= 1;
    }
}

// ============================================================
// Placeholder data
// ============================================================

/// Static task board shown when the Notion fetch fails.
pub fn placeholder_tasks() -> Vec<NotionTask> {
    let person = |name: &str| Person {
        id: None,
        name: name.to_string(),
        avatar: None,
    };
    let task = |title: &str, status: &str, due: Option<&str>, who: &str, desc: &str| NotionTask {
        id: None,
        title: title.to_string(),
        sprint: None,
        status: status.to_string(),
        due_date: due.map(str::to_string),
        assigned_to: vec![person(who)],
        short_description: desc.to_string(),
        description: format!("Status: {status}\n{desc}"),
        completed: status == "Done",
        highlighted: false,
    };

    vec![
        task(
            "Calibrate counter line A",
            "In Progress",
            Some("2026-09-01"),
            "Alice Johnson",
            "Sensor drift reported on the morning shift",
        ),
        task(
            "Replace hopper belt",
            "Backlog",
            Some("2026-09-08"),
            "Bob Smith",
            "Order the spare before the next production run",
        ),
        task(
            "Update wakeup payloads",
            "In Progress",
            None,
            "Carla Diaz",
            "Roll out the new pasteurizer temperature targets",
        ),
        task(
            "Close out August batch report",
            "Done",
            Some("2026-08-25"),
            "Alice Johnson",
            "Numbers reconciled against the leaderboard",
        ),
    ]
}

/// Static leaderboard shown when the console-integration fetch fails.
pub fn placeholder_entries() -> Vec<LeaderboardEntry> {
    let entry = |user: &str, count: f64, duration: f64| LeaderboardEntry {
        id: None,
        user: user.to_string(),
        count,
        duration_secs: duration,
        start: None,
        end: None,
        notes: String::new(),
    };

    vec![
        entry("Alice Johnson", 480.0, 3200.0),
        entry("Bob Smith", 250.0, 2800.0),
        entry("Carla Diaz", 120.0, 900.0),
        entry("Dan Wu", 40.0, 45.0),
    ]
}
