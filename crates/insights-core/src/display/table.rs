use crate::api::models::{
    AccountManagerSummary, AccountsPage, ActionList, ChartData, LeadershipSummary, Summary,
    UsageByStatus,
};
use crate::utils::text::{
    capitalize, format_compact_number, format_number, format_percentage, truncate_text,
};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

const LABEL_MIN_WIDTH: usize = 16;
const ACTION_ITEMS_SHOWN: usize = 5;

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
        }
        table
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn number_cell(value: u64) -> Cell {
        Cell::new(format_number(value)).set_alignment(CellAlignment::Right)
    }

    fn set_colored_headers(&self, table: &mut Table, headers: &[&str], color: Color) {
        let cells: Vec<Cell> = headers.iter().map(|h| self.bold_header(h, color)).collect();
        table.set_header(cells);
    }

    /// Width budget for the account label column
    fn label_width(&self) -> usize {
        (self.max_width.unwrap_or(80) / 5).max(LABEL_MIN_WIDTH)
    }

    pub fn render_accounts_page(&self, page: &AccountsPage) -> String {
        if page.items.is_empty() {
            return "No accounts match the current filters.".to_string();
        }

        let mut table = self.new_table();
        self.set_colored_headers(
            &mut table,
            &[
                "Account",
                "Status",
                "Seats",
                "Records",
                "Automations",
                "Messages",
                "Sent",
                "Billed",
                "Workflows",
            ],
            Color::Cyan,
        );

        let label_width = self.label_width();
        for record in &page.items {
            let status_color = if record.subscription.status == "active" {
                Color::Green
            } else {
                Color::DarkGrey
            };
            table.add_row(vec![
                Cell::new(truncate_text(&record.account_label, label_width)),
                self.colored_cell(&record.subscription.status, status_color),
                Self::number_cell(record.subscription.total_seats() as u64),
                Self::number_cell(record.usage.total_records),
                Self::number_cell(record.usage.automation_count),
                Self::number_cell(record.usage.messages_processed),
                Self::number_cell(record.usage.notifications_sent),
                Self::number_cell(record.usage.notifications_billed),
                Cell::new(truncate_text(&record.workflows.titles.join(", "), label_width)),
            ]);
        }

        format!("{}\n{}", table, Self::page_footer(page))
    }

    pub fn page_footer(page: &AccountsPage) -> String {
        format!(
            "Page {}/{} | {} per page | {} accounts",
            page.page,
            page.total_pages.max(1),
            page.page_size,
            format_number(page.total_items)
        )
    }

    pub fn render_summary(&self, summary: &Summary) -> String {
        match summary {
            Summary::Leadership(summary) => self.render_leadership(summary),
            Summary::AccountManager(summary) => self.render_account_manager(summary),
        }
    }

    fn render_key_values(&self, title: &str, rows: &[(&str, String)]) -> String {
        let mut table = self.new_table();
        self.set_colored_headers(&mut table, &[title, "Value"], Color::Cyan);
        for (label, value) in rows {
            table.add_row(vec![
                Cell::new(*label),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    fn render_leadership(&self, summary: &LeadershipSummary) -> String {
        let a = &summary.analytics;
        self.render_key_values(
            "Leadership overview",
            &[
                ("Accounts", format_number(a.accounts_total)),
                ("Active", format_number(a.accounts_active)),
                ("Inactive", format_number(a.accounts_inactive)),
                ("Workflows", format_number(a.workflows_total)),
                ("Unique workflow titles", format_number(a.workflow_titles_unique)),
                ("Automations", format_number(a.automation_count_total)),
                ("Messages processed", format_number(a.messages_processed_total)),
                ("Notifications sent", format_number(a.notifications_sent_total)),
                ("Notifications billed", format_number(a.notifications_billed_total)),
                ("Billed ratio", format_percentage(a.notifications_billed_ratio)),
            ],
        )
    }

    fn render_account_manager(&self, summary: &AccountManagerSummary) -> String {
        let a = &summary.analytics;
        let mut output = self.render_key_values(
            "Account manager overview",
            &[
                ("Accounts", format_number(a.accounts_total)),
                ("Inactive with usage", format_number(a.inactive_with_usage_count)),
                ("Active, zero activity", format_number(a.active_zero_activity_count)),
                ("Seats vs usage mismatch", format_number(a.seats_vs_usage_mismatch_count)),
                ("Billed vs sent anomalies", format_number(a.billed_vs_sent_anomalies_count)),
            ],
        );

        let lists = &summary.action_lists;
        for (title, list) in [
            ("Inactive with usage", &lists.inactive_with_usage),
            ("Active, zero activity", &lists.active_zero_activity),
            ("Seats vs usage mismatch", &lists.seats_vs_usage_mismatch),
            ("Billed vs sent anomalies", &lists.billed_vs_sent_anomalies),
        ] {
            output.push_str("\n\n");
            output.push_str(&self.render_action_list(title, list));
        }

        if let Some(notes) = summary.notes.as_ref().filter(|n| !n.is_empty()) {
            output.push_str("\n\nNotes:");
            for note in notes {
                output.push_str(&format!("\n  - {}", note));
            }
        }

        output
    }

    fn render_action_list(&self, title: &str, list: &ActionList) -> String {
        let mut output = format!("{} ({})\n  {}", title, list.items.len(), list.reason);
        for action in &list.recommended_actions {
            output.push_str(&format!("\n  → {}", action));
        }
        for item in list.items.iter().take(ACTION_ITEMS_SHOWN) {
            output.push_str(&format!("\n    {}  {}", item.account_label, item.account_uuid));
        }
        if list.items.len() > ACTION_ITEMS_SHOWN {
            output.push_str(&format!(
                "\n    ... and {} more",
                list.items.len() - ACTION_ITEMS_SHOWN
            ));
        }
        output
    }

    pub fn render_chart(&self, title: &str, chart: &ChartData) -> String {
        if chart.labels.is_empty() {
            return format!("{}: no data", title);
        }

        let mut table = self.new_table();
        self.set_colored_headers(&mut table, &[title, "Value"], Color::Green);
        for (label, value) in chart.points() {
            table.add_row(vec![
                Cell::new(capitalize(label)),
                Cell::new(format_compact_number(value)).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    pub fn render_usage_by_status(&self, usage: &UsageByStatus) -> String {
        let mut table = self.new_table();
        self.set_colored_headers(
            &mut table,
            &["Status", "Accounts", "Automations", "Messages", "Sent", "Billed", "Records"],
            Color::Green,
        );
        for (label, row) in [("Active", &usage.active), ("Inactive", &usage.inactive)] {
            table.add_row(vec![
                Cell::new(label),
                Self::number_cell(row.accounts),
                Self::number_cell(row.automation_count_total),
                Self::number_cell(row.messages_processed_total),
                Self::number_cell(row.notifications_sent_total),
                Self::number_cell(row.notifications_billed_total),
                Self::number_cell(row.total_records_total),
            ]);
        }
        table.to_string()
    }
}
