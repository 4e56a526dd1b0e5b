#![deny(unused_crate_dependencies)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, channel};

use camino::Utf8PathBuf;
use clap::Parser;
use egui::RichText;
use eyre::{Context, Result, anyhow};
use libgridview::{
    FieldDescriptor, GridConfig, InputType, Message, PaginationMode, QueryParams, Record,
    TableView, install_icon_font, logs, try_log_error,
};
use serde_json::Value;
use tracing::{info, warn};

#[derive(clap::Parser)]
#[command(version, about)]
struct Args {
    /// JSON file containing an array of objects.
    records: Utf8PathBuf,
    /// Language of the table labels, for example `en` or `de`.
    #[clap(long)]
    lang: Option<String>,
    /// Rows shown initially and added when scrolling to the end.
    #[clap(long)]
    page_size: Option<usize>,
    /// Hand the records to the table in chunks of this size when it asks for more.
    #[clap(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    chunk_size: Option<usize>,
    /// Comma separated identifiers of editable fields.
    #[clap(long, value_delimiter = ',')]
    editable: Vec<String>,
    /// File the filter state is restored from and saved to.
    #[clap(long, short)]
    state_file: Option<Utf8PathBuf>,
}

/// A committed cell: source index, field identifier, value.
type CellUpdate = (usize, String, Value);

struct GridApp {
    table: TableView,
    /// The host's copy of all records, with commits applied.
    records: Vec<Record>,
    /// Number of records handed to the table so far.
    delivered: usize,
    chunk_size: Option<usize>,
    fetch_requested: Rc<Cell<bool>>,
    commits: Receiver<CellUpdate>,
    params: Rc<RefCell<QueryParams>>,
    state_file: Option<Utf8PathBuf>,
    saved_query: String,
}

impl GridApp {
    fn apply_commits(&mut self) {
        let mut changed = false;
        for (source_index, field, value) in self.commits.try_iter() {
            let Some(record) = self.records.get_mut(source_index) else {
                warn!("Commit for unknown record {source_index}");
                continue;
            };
            info!("Record {source_index}: {field} = {value}");
            record.insert(field, value);
            changed = true;
        }
        if changed {
            self.table
                .update(Message::SetRecords(self.records[..self.delivered].to_vec()));
        }
    }

    fn answer_fetch(&mut self) {
        if !self.fetch_requested.replace(false) {
            return;
        }
        let chunk_size = self.chunk_size.unwrap_or(self.records.len());
        let end = (self.delivered + chunk_size).min(self.records.len());
        if end == self.delivered {
            self.table.fetch_completed();
            return;
        }
        info!("Delivering records {}..{}", self.delivered, end);
        self.table
            .update(Message::AppendRecords(self.records[self.delivered..end].to_vec()));
        self.delivered = end;
    }

    fn save_state(&mut self) {
        let Some(state_file) = &self.state_file else {
            return;
        };
        let query = self.params.borrow().to_query_string();
        if query == self.saved_query {
            return;
        }
        try_log_error!(
            std::fs::write(state_file, &query),
            format!("Failed to write state to {state_file}")
        );
        self.saved_query = query;
    }
}

impl eframe::App for GridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_commits();
        self.answer_fetch();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.table.show(ui);
        });

        self.save_state();
        if self.fetch_requested.get() {
            ctx.request_repaint();
        }
    }
}

fn read_records(path: &Utf8PathBuf) -> Result<Vec<Record>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let values: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("{path} is not a JSON array"))?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let record = Record::from_json(value);
            if record.is_none() {
                warn!("Skipping entry {i} of {path}, which is not an object");
            }
            record
        })
        .collect())
}

/// Editor for a field, guessed from the values in the records.
fn guess_input_type(records: &[Record], field: &str) -> InputType {
    let mut values = records.iter().filter_map(|record| record.get(field));
    match values.next() {
        Some(Value::Bool(_)) => InputType::Checkbox,
        Some(Value::Number(_)) if values.all(Value::is_number) => InputType::Number,
        _ => InputType::Text,
    }
}

/// One field per record key, in order of first appearance.
fn fields_for(
    records: &[Record],
    editable: &[String],
    commits: &Sender<CellUpdate>,
) -> Vec<FieldDescriptor> {
    let mut identifiers: Vec<&String> = vec![];
    for record in records {
        for (key, _) in record.fields() {
            if !identifiers.contains(&key) {
                identifiers.push(key);
            }
        }
    }

    identifiers
        .into_iter()
        .map(|identifier| {
            let field = FieldDescriptor::new(identifier.as_str(), identifier.as_str());
            if !editable.contains(identifier) {
                return field;
            }
            let sender = commits.clone();
            field
                .editable(guess_input_type(records, identifier))
                .on_commit(move |commit| {
                    let update = (
                        commit.source_index,
                        commit.field.identifier.clone(),
                        commit.value.clone(),
                    );
                    try_log_error!(sender.send(update), "Failed to forward commit");
                })
        })
        .collect()
}

fn main() -> Result<()> {
    simple_eyre::install()?;
    logs::start_logging()?;

    // The save dialog talks to the desktop portal through tokio.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let _enter = runtime.enter();
    std::thread::spawn(move || {
        runtime.block_on(async {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
            }
        });
    });

    let args = Args::parse();
    let records = read_records(&args.records)?;
    info!("Loaded {} records from {}", records.len(), args.records);

    let mut config = GridConfig::new(false)?;
    if let Some(lang) = args.lang {
        config = config.with_lang(lang);
    }
    if let Some(page_size) = args.page_size {
        config = config.with_page_size(page_size);
    }
    if args.chunk_size.is_some() {
        config = config.with_pagination(PaginationMode::HostFed);
        config.expected_total = Some(records.len());
    }

    let params = match &args.state_file {
        Some(file) if file.exists() => std::fs::read_to_string(file)
            .map(|query| QueryParams::parse(&query))
            .unwrap_or_else(|e| {
                warn!("Failed to read state from {file}, starting without filters: {e}");
                QueryParams::new()
            }),
        _ => QueryParams::new(),
    };
    let saved_query = params.to_query_string();
    let params = Rc::new(RefCell::new(params));

    let (commit_sender, commits) = channel();
    let fields = fields_for(&records, &args.editable, &commit_sender);
    let delivered = args.chunk_size.unwrap_or(records.len()).min(records.len());

    let fetch_requested = Rc::new(Cell::new(false));
    let fetch_flag = Rc::clone(&fetch_requested);
    let table = TableView::new(fields, config)?
        .with_query_state(Rc::clone(&params))
        .with_records(records[..delivered].to_vec())
        .on_fetch_more(move || fetch_flag.set(true))
        .on_expand(|ui, _, record| {
            let text = serde_json::to_string_pretty(record).unwrap_or_else(|e| e.to_string());
            ui.label(RichText::new(text).monospace());
        });

    let app = GridApp {
        table,
        records,
        delivered,
        chunk_size: args.chunk_size,
        fetch_requested,
        commits,
        params,
        state_file: args.state_file,
        saved_query,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_app_id("org.gridview.gridview")
            .with_title(format!("gridview - {}", args.records)),
        ..Default::default()
    };

    eframe::run_native(
        "gridview",
        options,
        Box::new(|cc| {
            install_icon_font(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("Failed to run the viewer: {e}"))
}
