use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use folio_core::{DashboardStats, Document, Filter, SortOrder};

use crate::app::AppContext;
use crate::cli::{FindArgs, StatsArgs};
use crate::helpers::{cell_text, parse_filter};

fn new_table(headers: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

pub fn handle_stats(ctx: &AppContext, args: &StatsArgs) -> anyhow::Result<()> {
    let stats = DashboardStats::collect(ctx.store())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let rows = [
        ("Projects", stats.total_projects),
        ("Active services", stats.total_services),
        ("Approved testimonials", stats.total_testimonials),
        ("Contact inquiries", stats.total_contacts),
        ("Unread inquiries", stats.unread_contacts),
        ("Published posts", stats.published_blogs),
        ("Blog posts", stats.total_blogs),
    ];

    if ctx.quiet() {
        for (label, count) in rows {
            println!("{} {}", label, count);
        }
        return Ok(());
    }

    let mut table = new_table(vec!["Metric".to_string(), "Count".to_string()]);
    for (label, count) in rows {
        table.add_row(vec![label.to_string(), count.to_string()]);
    }
    println!("{}", table);

    if !stats.recent_contacts.is_empty() {
        println!();
        println!("Recent inquiries");
        let mut recent = new_table(
            ["Received", "Name", "Email", "Project", "Read"]
                .iter()
                .map(|header| header.to_string())
                .collect(),
        );
        for contact in &stats.recent_contacts {
            recent.add_row(vec![
                contact.created_at.format("%Y-%m-%d %H:%M").to_string(),
                contact.name.clone(),
                contact.email.clone(),
                contact.project_type.clone(),
                if contact.read { "yes" } else { "no" }.to_string(),
            ]);
        }
        println!("{}", recent);
    }
    Ok(())
}

pub fn handle_collections(ctx: &AppContext) -> anyhow::Result<()> {
    let names = ctx.store().collection_names()?;
    if names.is_empty() {
        if !ctx.quiet() {
            println!("No collections yet. Run `folio init` first.");
        }
        return Ok(());
    }

    let mut table = new_table(vec!["Collection".to_string(), "Records".to_string()]);
    for name in &names {
        let count = ctx.store().collection(name)?.count(&Filter::new())?;
        if ctx.quiet() {
            println!("{} {}", name, count);
        } else {
            table.add_row(vec![name.clone(), count.to_string()]);
        }
    }
    if !ctx.quiet() {
        println!("{}", table);
    }
    Ok(())
}

pub fn handle_find(ctx: &AppContext, args: &FindArgs) -> anyhow::Result<()> {
    let collection = ctx.store().collection(&args.collection)?;
    let mut cursor = collection.find(parse_filter(&args.conditions)?);
    if let Some(field) = &args.sort {
        let order = if args.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        cursor = cursor.sort(field.clone(), order);
    }
    let records = cursor.to_list(args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        if !ctx.quiet() {
            println!("No records found.");
        }
        return Ok(());
    }

    let columns = column_names(&records);
    let mut table = new_table(columns.clone());
    for record in &records {
        table.add_row(
            columns
                .iter()
                .map(|column| cell_text(record.get(column)))
                .collect::<Vec<_>>(),
        );
    }
    println!("{}", table);
    if !ctx.quiet() {
        println!("{} record(s)", records.len());
    }
    Ok(())
}

/// Field names in first-seen order across all records; password hashes
/// are never shown.
fn column_names(records: &[Document]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if key != "password" && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}
