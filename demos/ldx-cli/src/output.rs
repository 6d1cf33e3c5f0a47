//! Styled terminal output

use console::style;
use ldx_insight_client::api::{CategoryStat, Dataset, DatasetPage, SummaryStats};
use ldx_insight_client::session::Navigation;
use ldx_insight_client::utils::truncate_for_display;

use crate::config;

const TITLE_WIDTH: usize = 48;

/// Apply color settings before anything is printed
pub fn init() {
    if config::no_color() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

/// Display a success message
pub fn display_success(msg: &str) {
    println!("{} {}", style("ok:").green().bold(), msg);
}

/// Display an error message
pub fn display_error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}

/// Display a warning message
pub fn display_warning(msg: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), msg);
}

/// Tell the user where the session would have navigated them
pub fn display_navigation(navigation: &Navigation) {
    println!(
        "    {} {}",
        style("navigate:").dim(),
        style(navigation.href()).cyan().dim()
    );
}

/// Print any value as pretty JSON
pub fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dataset_row(dataset: &Dataset) {
    println!(
        "  {:<12} {:<width$} {:>7} {:>7}  {}",
        style(truncate_for_display(&dataset.id, 12)).cyan(),
        truncate_for_display(&dataset.title, TITLE_WIDTH),
        dataset.view_count,
        dataset.download_count,
        style(dataset.category.as_deref().unwrap_or("-")).dim(),
        width = TITLE_WIDTH + 3,
    );
}

fn dataset_header() {
    println!(
        "  {:<12} {:<width$} {:>7} {:>7}  {}",
        style("ID").bold(),
        style("TITLE").bold(),
        style("VIEWS").bold(),
        style("DL").bold(),
        style("CATEGORY").bold(),
        width = TITLE_WIDTH + 3,
    );
}

/// Display a list of datasets
pub fn display_datasets(datasets: &[Dataset]) {
    if datasets.is_empty() {
        println!("{}", style("No datasets.").dim());
        return;
    }
    dataset_header();
    for dataset in datasets {
        dataset_row(dataset);
    }
}

/// Display one page of search results
pub fn display_page(page: &DatasetPage) {
    display_datasets(&page.content);
    println!();
    println!(
        "{}",
        style(format!(
            "page {} of {} ({} datasets)",
            page.number + 1,
            page.total_pages.max(1),
            page.total_elements
        ))
        .dim()
    );
    if page.has_next() {
        println!(
            "{}",
            style(format!("next: --page {}", page.number + 1)).dim()
        );
    }
}

/// Display a single dataset
pub fn display_dataset(dataset: &Dataset) {
    println!("{}", style(&dataset.title).bold());
    println!("  {} {}", style("id:").dim(), dataset.id);
    if let Some(category) = &dataset.category {
        println!("  {} {}", style("category:").dim(), category);
    }
    if let Some(source) = &dataset.source {
        println!("  {} {}", style("source:").dim(), source);
    }
    if !dataset.tags.is_empty() {
        println!("  {} {}", style("tags:").dim(), dataset.tags.join(", "));
    }
    println!(
        "  {} {} views, {} downloads",
        style("usage:").dim(),
        dataset.view_count,
        dataset.download_count
    );
    if let Some(description) = &dataset.description {
        println!();
        println!("{description}");
    }
}

/// Display platform counters
pub fn display_summary(summary: &SummaryStats) {
    println!("{}", style("LDX Insight").bold());
    println!("  {:<12} {}", style("datasets").dim(), summary.total_datasets);
    println!("  {:<12} {}", style("categories").dim(), summary.total_categories);
    println!("  {:<12} {}", style("views").dim(), summary.total_views);
    println!("  {:<12} {}", style("downloads").dim(), summary.total_downloads);
}

/// Display per-category counts as a bar chart
pub fn display_categories(stats: &[CategoryStat]) {
    let max = stats.iter().map(|stat| stat.count).max().unwrap_or(0).max(1);
    for stat in stats {
        let width = usize::try_from(stat.count * 30 / max).unwrap_or(30);
        println!(
            "  {:<24} {} {}",
            truncate_for_display(&stat.category, 24),
            style("█".repeat(width.max(1))).cyan(),
            stat.count
        );
    }
}
