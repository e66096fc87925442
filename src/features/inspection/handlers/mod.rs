mod inspection_handler;

pub use inspection_handler::{
    __path_get_inspection, __path_start_inspection, __path_stop_inspection, get_inspection,
    start_inspection, stop_inspection,
};
