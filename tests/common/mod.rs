//! Common test utilities for the recibos-importer integration tests

use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub const FULL_HEADER: &str =
    "date,client_name,client_tax_id,concept,amount,tax,total,client_email";

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write test fixture");
    path
}

/// Three well-formed receipt rows covering the full expected schema.
#[allow(dead_code)]
pub fn sample_csv() -> String {
    format!(
        "{FULL_HEADER}\n\
         2024-01-15,Estudio Lopez,20123456789,Consultoria legal,100.00,18.00,118.00,lopez@example.com\n\
         2024-03-20,Comercial Andina,20456789012,Asesoria contable,200.00,36.00,236.00,andina@example.com\n\
         2024-02-01,Servicios Chavez,10789012345,Desarrollo de software,300.00,54.00,354.00,chavez@example.com\n"
    )
}
