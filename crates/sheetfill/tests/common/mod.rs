//! Helpers shared by the integration tests

use sheetfill_xlsx::testing::read_part;

/// A worksheet part of a package as text
pub fn sheet_xml(package: &[u8], number: usize) -> String {
    let part = format!("xl/worksheets/sheet{}.xml", number);
    let bytes = read_part(package, &part).unwrap().unwrap();
    String::from_utf8(bytes).unwrap()
}
