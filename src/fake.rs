//! Scripted stand-in for the SEACE search page, used by unit tests.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Selectors;
use crate::error::DriverError;
use crate::traits::{By, Document};

const ACTION_PREFIX: &str = "tbBuscador:idFormBuscarProceso:dtProcesos:";
const LEGENDS: [&str; 2] = ["Información general", "Ver listado de ítems"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    SelectionTabButton,
    SelectionTab,
    AdvancedSearch,
    StartDate,
    EndDate,
    SearchButton,
    Summary(usize),
    TableBody,
    Row(usize),
    Cell(usize, usize),
    Action(usize, usize),
    PageButton(usize),
    Next,
    Previous,
    ReturnButton,
    Field(&'static str),
    Legend(usize),
    ItemsContent,
    ItemSpan,
    WinnerTable,
    WinnerCell(usize),
    /// Copy of a list control inside the hidden first tab
    OtherTab(&'static str),
}

/// Observable side effects, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Next,
    Previous,
    Scroll,
    Open(usize),
    Return,
    Typed(String),
    Search,
    OtherTabClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    List,
    Detail(usize),
}

struct State {
    total: usize,
    page_size: usize,
    active_page: usize,
    view: View,
    searched: bool,
    advanced_open: bool,
    listing_open: bool,
    paginator_hidden: bool,
    stuck: bool,
    no_winner: HashSet<usize>,
    broken_record: Option<usize>,
    summary: Option<String>,
    row_cells: usize,
    row_actions: usize,
    failing_screenshots: bool,
    class_read_failures: usize,
    events: Vec<Event>,
}

pub(crate) struct FakeSite {
    selectors: Selectors,
    state: Mutex<State>,
}

impl FakeSite {
    /// A results list of `total` records, already searched, showing page 1.
    pub(crate) fn new(total: usize) -> Self {
        Self {
            selectors: Selectors::default(),
            state: Mutex::new(State {
                total,
                page_size: 15,
                active_page: 1,
                view: View::List,
                searched: true,
                advanced_open: false,
                listing_open: false,
                paginator_hidden: false,
                stuck: false,
                no_winner: HashSet::new(),
                broken_record: None,
                summary: None,
                row_cells: 13,
                row_actions: 2,
                failing_screenshots: false,
                class_read_failures: 0,
                events: Vec::new(),
            }),
        }
    }

    fn update(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub(crate) fn unsearched(self) -> Self {
        self.update(|s| s.searched = false)
    }

    pub(crate) fn with_active_page(self, page: usize) -> Self {
        self.update(|s| s.active_page = page)
    }

    pub(crate) fn with_no_winner(self, index: usize) -> Self {
        self.update(|s| {
            s.no_winner.insert(index);
        })
    }

    /// The nomenclature field of `index` will be missing.
    pub(crate) fn with_broken_record(self, index: usize) -> Self {
        self.update(|s| s.broken_record = Some(index))
    }

    pub(crate) fn with_summary(self, text: &str) -> Self {
        let text = text.to_string();
        self.update(|s| s.summary = Some(text))
    }

    pub(crate) fn with_row_cells(self, cells: usize) -> Self {
        self.update(|s| s.row_cells = cells)
    }

    pub(crate) fn with_row_actions(self, actions: usize) -> Self {
        self.update(|s| s.row_actions = actions)
    }

    /// Paginator clicks register but the page never changes.
    pub(crate) fn stuck(self) -> Self {
        self.update(|s| s.stuck = true)
    }

    /// Paginator is absent until the page is scrolled.
    pub(crate) fn with_hidden_paginator(self) -> Self {
        self.update(|s| s.paginator_hidden = true)
    }

    pub(crate) fn with_failing_screenshots(self) -> Self {
        self.update(|s| s.failing_screenshots = true)
    }

    pub(crate) fn with_class_read_failures(self, failures: usize) -> Self {
        self.update(|s| s.class_read_failures = failures)
    }

    pub(crate) fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub(crate) fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub(crate) fn paginator_clicks(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Next | Event::Previous))
            .count()
    }

    pub(crate) fn active_page(&self) -> usize {
        self.state.lock().unwrap().active_page
    }

    fn page_count(state: &State) -> usize {
        state.total.div_ceil(state.page_size).max(1)
    }

    fn rows_on_page(state: &State) -> std::ops::Range<usize> {
        let start = (state.active_page - 1) * state.page_size;
        start.min(state.total)..(start + state.page_size).min(state.total)
    }

    fn action_id(index: usize, action: usize) -> String {
        format!("{}{}:j_idt{}", ACTION_PREFIX, index, 300 + action)
    }

    fn parse_action_id(id: &str) -> Option<(usize, usize)> {
        let rest = id.strip_prefix(ACTION_PREFIX)?;
        let (index, tail) = rest.split_once(':')?;
        let action = tail.strip_prefix("j_idt")?.parse::<usize>().ok()?.checked_sub(300)?;
        Some((index.parse().ok()?, action))
    }

    /// Nodes matching `by`, either document-wide or inside the selection tab.
    fn resolve(&self, state: &State, by: &By, in_tab: bool) -> Vec<Node> {
        let s = &self.selectors;
        let list = state.view == View::List;
        let detail = !list;
        let results = list && state.searched;
        let paginator = results && state.total > 0 && !state.paginator_hidden;
        // the hidden first tab precedes the selection tab in document order
        let with_hidden = |name: &'static str, nodes: Vec<Node>| -> Vec<Node> {
            if in_tab {
                nodes
            } else {
                [vec![Node::OtherTab(name)], nodes].concat()
            }
        };

        if list && by == &s.advanced_search {
            with_hidden("legend", vec![Node::AdvancedSearch])
        } else if list && state.advanced_open && by == &s.start_date {
            vec![Node::StartDate]
        } else if list && state.advanced_open && by == &s.end_date {
            vec![Node::EndDate]
        } else if list && by == &s.search_button {
            vec![Node::SearchButton]
        } else if list && by == &s.results_summary {
            let own = if results {
                vec![Node::Summary(0), Node::Summary(1)]
            } else {
                Vec::new()
            };
            with_hidden("summary", own)
        } else if results && by == &s.table_body {
            vec![Node::TableBody]
        } else if list && by == &s.page_button {
            let own = if paginator {
                (1..=Self::page_count(state)).map(Node::PageButton).collect()
            } else {
                Vec::new()
            };
            with_hidden("page", own)
        } else if list && by == &s.next_page {
            let own = if paginator { vec![Node::Next, Node::Next] } else { Vec::new() };
            with_hidden("next", own)
        } else if list && by == &s.previous_page {
            let own = if paginator {
                vec![Node::Previous, Node::Previous]
            } else {
                Vec::new()
            };
            with_hidden("previous", own)
        } else if in_tab {
            Vec::new()
        } else if list && by == &s.selection_tab_button {
            vec![Node::SelectionTabButton]
        } else if list && by == &s.selection_tab {
            vec![Node::SelectionTab]
        } else if detail && by == &s.return_button {
            vec![Node::ReturnButton]
        } else if detail && by == &s.legend {
            (0..LEGENDS.len()).map(Node::Legend).collect()
        } else if detail && by == &s.items_content {
            vec![Node::ItemsContent]
        } else if detail && by == &s.winner_table {
            vec![Node::WinnerTable]
        } else if detail {
            let View::Detail(index) = state.view else {
                return Vec::new();
            };
            let field = if by == &s.nomenclature {
                "nomenclature"
            } else if by == &s.entity {
                "entity"
            } else if by == &s.object_type {
                "object_type"
            } else if by == &s.value {
                "value"
            } else if by == &s.currency {
                "currency"
            } else {
                return Vec::new();
            };
            if field == "nomenclature" && state.broken_record == Some(index) {
                return Vec::new();
            }
            vec![Node::Field(field)]
        } else if let (true, By::Id(id)) = (results, by) {
            match Self::parse_action_id(id) {
                Some((index, action))
                    if Self::rows_on_page(state).contains(&index) && action < state.row_actions =>
                {
                    vec![Node::Action(index, action)]
                }
                _ => Vec::new(),
            }
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl Document for FakeSite {
    type Element = Node;

    async fn find_one(&self, by: &By) -> Result<Node, DriverError> {
        self.find_all(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound(by.to_string()))
    }

    async fn find_all(&self, by: &By) -> Result<Vec<Node>, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(self.resolve(&state, by, false))
    }

    async fn find_within(&self, parent: &Node, by: &By) -> Result<Vec<Node>, DriverError> {
        let state = self.state.lock().unwrap();
        if *parent == Node::SelectionTab {
            return Ok(self.resolve(&state, by, true));
        }
        let tag = match by {
            By::TagName(tag) => tag.as_str(),
            other => return Err(DriverError::Unsupported(other.to_string())),
        };

        let nodes = match (parent, tag) {
            (Node::TableBody, "tr") => Self::rows_on_page(&state).map(Node::Row).collect(),
            (Node::Row(i), "td") => (0..state.row_cells).map(|c| Node::Cell(*i, c)).collect(),
            (Node::Cell(i, 12), "a") => (0..state.row_actions).map(|a| Node::Action(*i, a)).collect(),
            (Node::ItemsContent, "span") if state.listing_open => vec![Node::ItemSpan],
            (Node::WinnerTable, "td") => match state.view {
                View::Detail(i) if state.no_winner.contains(&i) => vec![Node::WinnerCell(0)],
                _ => (0..3).map(Node::WinnerCell).collect(),
            },
            _ => Vec::new(),
        };
        Ok(nodes)
    }

    async fn click(&self, element: &Node) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let pages = Self::page_count(&state);

        match element {
            Node::AdvancedSearch => state.advanced_open = true,
            Node::SearchButton => {
                state.searched = true;
                state.events.push(Event::Search);
            }
            Node::Next => {
                if !state.stuck && state.active_page < pages {
                    state.active_page += 1;
                }
                state.events.push(Event::Next);
            }
            Node::Previous => {
                if !state.stuck && state.active_page > 1 {
                    state.active_page -= 1;
                }
                state.events.push(Event::Previous);
            }
            Node::Action(index, 1) => {
                state.view = View::Detail(*index);
                state.events.push(Event::Open(*index));
            }
            Node::Legend(1) => state.listing_open = true,
            Node::OtherTab(_) => state.events.push(Event::OtherTabClick),
            Node::ReturnButton => {
                state.view = View::List;
                state.listing_open = false;
                state.events.push(Event::Return);
            }
            _ => {}
        }
        Ok(())
    }

    async fn type_text(&self, element: &Node, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        match element {
            Node::StartDate | Node::EndDate => {
                state.events.push(Event::Typed(text.to_string()));
                Ok(())
            }
            other => Err(DriverError::Protocol(format!("{:?} is not an input", other))),
        }
    }

    async fn text(&self, element: &Node) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        let index = match state.view {
            View::Detail(i) => i,
            View::List => 0,
        };
        let (from, to) = {
            let rows = Self::rows_on_page(&state);
            if rows.is_empty() {
                (0, 0)
            } else {
                (rows.start + 1, rows.end)
            }
        };

        let text = match element {
            Node::Summary(0) => format!("Página {} de {}", state.active_page, Self::page_count(&state)),
            Node::Summary(_) => state.summary.clone().unwrap_or_else(|| {
                format!("Mostrando {} - {} de un total de {} registros", from, to, state.total)
            }),
            Node::PageButton(n) => n.to_string(),
            Node::OtherTab("summary") => "Mostrando 1 - 15 de un total de 999 registros".to_string(),
            Node::OtherTab("page") => "9".to_string(),
            Node::Field("nomenclature") => format!("LP-{}-2024", index),
            Node::Field("entity") => format!("Entidad {}", index),
            Node::Field("object_type") => "Bien".to_string(),
            Node::Field("value") => "1500.00".to_string(),
            Node::Field("currency") => "Soles".to_string(),
            Node::Legend(i) => LEGENDS[*i].to_string(),
            Node::ItemSpan => format!("Adquisición {}", index),
            Node::WinnerCell(0) if state.no_winner.contains(&index) => {
                "No se encontraron Datos".to_string()
            }
            Node::WinnerCell(0) => format!("Proveedor {}", index),
            Node::WinnerCell(1) => "SI".to_string(),
            Node::WinnerCell(_) => "NO".to_string(),
            _ => String::new(),
        };
        Ok(text)
    }

    async fn attribute(&self, element: &Node, name: &str) -> Result<Option<String>, DriverError> {
        let mut state = self.state.lock().unwrap();
        let pages = Self::page_count(&state);

        if name == "class" {
            if state.class_read_failures > 0 {
                state.class_read_failures -= 1;
                return Err(DriverError::Protocol("stale element reference".into()));
            }
            let class = match element {
                Node::PageButton(n) if *n == state.active_page => {
                    "ui-paginator-page ui-state-default ui-state-active ui-corner-all"
                }
                Node::PageButton(_) => "ui-paginator-page ui-state-default ui-corner-all",
                Node::Next if state.active_page >= pages => {
                    "ui-paginator-next ui-state-default ui-corner-all ui-state-disabled"
                }
                Node::Previous if state.active_page <= 1 => {
                    "ui-paginator-prev ui-state-default ui-corner-all ui-state-disabled"
                }
                Node::Next => "ui-paginator-next ui-state-default ui-corner-all",
                Node::Previous => "ui-paginator-prev ui-state-default ui-corner-all",
                Node::OtherTab("page") => "ui-paginator-page ui-state-default ui-state-active ui-corner-all",
                Node::OtherTab("next") => "ui-paginator-next ui-state-default ui-corner-all",
                Node::OtherTab("previous") => "ui-paginator-prev ui-state-default ui-corner-all",
                _ => return Ok(None),
            };
            return Ok(Some(class.to_string()));
        }

        match (element, name) {
            (Node::Action(index, action), "id") => Ok(Some(Self::action_id(*index, *action))),
            _ => Ok(None),
        }
    }

    async fn is_displayed(&self, _element: &Node) -> Result<bool, DriverError> {
        Ok(true)
    }

    async fn is_enabled(&self, _element: &Node) -> Result<bool, DriverError> {
        Ok(true)
    }

    async fn execute_script(&self, _script: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.paginator_hidden = false;
        state.events.push(Event::Scroll);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        if self.state.lock().unwrap().failing_screenshots {
            return Err(DriverError::Protocol("capture failed".into()));
        }
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}

/// Formatted log output of the current thread, for asserting on log lines.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's events here until the guard drops.
    pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn matching(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
