pub mod pipeline;
pub mod render;
pub mod row;
pub mod schema;
pub mod state;
pub mod value;

pub use pipeline::{DerivationCache, DerivedRow, ViewModel, VisibleColumn, derive};
pub use row::{DEFAULT_ROW_ID_FIELD, Dataset, PayloadError, Row};
pub use schema::{
    Accessor, ColumnDescriptor, ColumnSchema, Header, RenderFn, RenderedCell, RowAction,
    SchemaError, Tone,
};
pub use state::{
    FilterState, SortColumn, SortDirection, SortState, TableState, TableStore, VisibilityState,
};
pub use value::CellValue;
