use std::ffi::OsStr;
use std::path::Path;

pub trait PathExt {
    fn is_csv_file(&self) -> bool;
}

impl PathExt for Path {
    fn is_csv_file(&self) -> bool {
        self.is_file()
            && self
                .extension()
                .and_then(OsStr::to_str)
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
    }
}
