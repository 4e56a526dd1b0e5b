//! A data-table widget for egui.
//!
//! [`TableView`] renders host records with client-side filtering, sorting,
//! scroll-triggered pagination, inline editing, row expansion and CSV export.

pub mod config;
pub mod export;
pub mod i18n;
pub mod logs;
pub mod message;
pub mod query_state;
pub mod state;
pub mod table;

use egui::{FontData, FontDefinitions, FontFamily};

pub use config::GridConfig;
pub use export::ExportError;
pub use message::Message;
pub use query_state::{QueryParams, QueryState};
pub use state::{GridError, TableView};
pub use table::{
    EditCommit, FieldDescriptor, FilterState, InputType, PaginationMode, Record, RowFilter,
    RowFilterOperator, TableCell, TableSortDirection, TableSortKey, TableSortSpec,
    WorkingRowSet,
};

/// Adds the remix icon font used for the expander and toolbar icons.
pub fn install_icon_font(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();

    fonts.font_data.insert(
        "remix_icons".to_owned(),
        FontData::from_static(egui_remixicon::FONT).into(),
    );

    if let Some(family) = fonts.families.get_mut(&FontFamily::Proportional) {
        family.push("remix_icons".to_owned());
    }

    ctx.set_fonts(fonts);
}
