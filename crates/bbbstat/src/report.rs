use bbbstat_core::Dashboard;
use comfy_table::Table;

/// Terminal output of `bbbstat summary`: one row per summary card, then the
/// record count.
pub fn render_summary(dashboard: &Dashboard) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Spalte", "Summe"]);
    for card in dashboard.summary_cards() {
        table.add_row(vec![card.title, card.total.to_string()]);
    }
    format!("{table}\n{} records", dashboard.dataset().len())
}
