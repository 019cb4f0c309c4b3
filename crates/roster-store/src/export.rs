//! CSV export of a collection or a filtered view of it.
//!
//! Output is UTF-8 with a byte-order mark so spreadsheet tools pick the
//! right encoding for Arabic text. Each record kind has a fixed column
//! order and Arabic headers.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use roster_types::{Ambulance, CollectionKind, Employee, EmployeeId, Shift, Task, Team};

use crate::database::Database;
use crate::entity::Entity;
use crate::error::StoreError;
use crate::filter::Filters;

/// UTF-8 byte-order mark written before the header row.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A record that can be written as one CSV row.
pub trait CsvRecord {
    /// Arabic column headers, in column order.
    const HEADERS: &'static [&'static str];

    /// The record's cells, in the order of [`CsvRecord::HEADERS`].
    fn csv_row(&self) -> Vec<String>;
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

fn id_list(ids: &[EmployeeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

impl CsvRecord for Employee {
    const HEADERS: &'static [&'static str] = &[
        "المعرف",
        "الاسم",
        "الوظيفة",
        "تاريخ الإنشاء",
        "رمز الموظف",
        "رقم الهاتف",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.role.clone(),
            timestamp(self.created_at),
            opt(self.code.as_ref()),
            opt(self.phone.as_ref()),
        ]
    }
}

impl CsvRecord for Ambulance {
    const HEADERS: &'static [&'static str] = &[
        "المعرف",
        "رقم اللوحة",
        "الطراز",
        "الحالة",
        "آخر صيانة",
        "ملاحظات",
        "تاريخ الإنشاء",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.plate.clone(),
            opt(self.model.as_ref()),
            self.status.label_ar().to_owned(),
            opt(self.last_service.as_ref()),
            opt(self.notes.as_ref()),
            timestamp(self.created_at),
        ]
    }
}

impl CsvRecord for Shift {
    const HEADERS: &'static [&'static str] = &[
        "المعرف",
        "التاريخ",
        "نوع الوردية",
        "الموظفون",
        "سيارة الإسعاف",
        "القطاع",
        "رئيس الطاقم",
        "تاريخ الإنشاء",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.to_string(),
            self.shift_type.label_ar().to_owned(),
            id_list(&self.employee_ids),
            opt(self.ambulance_id.as_ref()),
            opt(self.sector.as_ref()),
            opt(self.chief_name.as_ref()),
            timestamp(self.created_at),
        ]
    }
}

impl CsvRecord for Team {
    const HEADERS: &'static [&'static str] = &[
        "المعرف",
        "التاريخ",
        "نوع الوردية",
        "الأعضاء",
        "الحالة",
        "فرق صباحية",
        "فرق مسائية",
        "فرق 24 ساعة",
        "إجمالي الفرق",
        "ملاحظات",
        "تاريخ الإنشاء",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.to_string(),
            self.shift_type
                .map(|s| s.label_ar().to_owned())
                .unwrap_or_default(),
            id_list(&self.member_ids),
            self.status.clone(),
            self.morning_teams.to_string(),
            self.evening_teams.to_string(),
            self.full_teams.to_string(),
            self.total_teams().to_string(),
            opt(self.notes.as_ref()),
            timestamp(self.created_at),
        ]
    }
}

impl CsvRecord for Task {
    const HEADERS: &'static [&'static str] = &[
        "المعرف",
        "الوصف",
        "الموظف",
        "المشرف",
        "الحالة",
        "تاريخ الإنشاء",
        "آخر تحديث",
        "تاريخ الإنجاز",
    ];

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.description.clone(),
            self.employee_id.to_string(),
            self.supervisor_name.clone(),
            self.status.clone(),
            timestamp(self.created_at),
            self.updated_at.map(timestamp).unwrap_or_default(),
            self.completed_at.map(timestamp).unwrap_or_default(),
        ]
    }
}

/// Write `records` as CSV, BOM first.
///
/// # Errors
///
/// Returns [`StoreError::Storage`] if the CSV writer fails.
pub fn to_csv<E: Entity + CsvRecord>(records: &[E]) -> Result<Vec<u8>, StoreError> {
    let csv_error = |e: csv::Error| StoreError::Storage {
        path: E::COLLECTION.as_str().into(),
        message: format!("csv export: {e}"),
    };

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(E::HEADERS).map_err(csv_error)?;
    for record in records {
        writer.write_record(record.csv_row()).map_err(csv_error)?;
    }
    writer.into_inner().map_err(|e| StoreError::Storage {
        path: E::COLLECTION.as_str().into(),
        message: format!("csv export: {}", e.error()),
    })
}

/// Export the records of `E` matching `filters` as CSV bytes.
pub fn export<E: Entity + CsvRecord>(db: &Database, filters: &Filters) -> Result<Vec<u8>, StoreError> {
    let records = db.list::<E>(filters)?;
    tracing::debug!(collection = %E::COLLECTION, rows = records.len(), "Exporting CSV");
    to_csv(&records)
}

/// Download file name: `<collection>[_<filter values>]_<YYYYMMDD>.csv`.
///
/// Filter values are reduced to ASCII letters, digits, and `-`; values
/// that reduce to nothing are left out.
pub fn file_name(collection: CollectionKind, filters: &Filters, today: NaiveDate) -> String {
    let mut parts = vec![collection.as_str().to_owned()];
    parts.extend(filters.iter().filter_map(|(_, value)| {
        let clean: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        (!clean.is_empty()).then_some(clean)
    }));
    parts.push(today.format("%Y%m%d").to_string());
    format!("{}.csv", parts.join("_"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::database::object;
    use serde_json::json;

    #[test]
    fn employee_export_starts_with_bom_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        let ahmed: Employee = db
            .create(&object(json!({"name": "Ahmed", "role": "driver"})))
            .unwrap();

        let bytes = export::<Employee>(&db, &Filters::new()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], Employee::HEADERS.join(","));
        assert!(lines[1].starts_with(&format!(
            "1,Ahmed,driver,{}",
            timestamp(ahmed.created_at)
        )));
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        db.create::<Employee>(&object(json!({"name": "Salem, Ahmed", "role": "medic"})))
            .unwrap();

        let bytes = export::<Employee>(&db, &Filters::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Salem, Ahmed\""));
    }

    #[test]
    fn filtered_export_keeps_only_matches() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        for (name, role) in [("a", "driver"), ("b", "medic"), ("c", "driver")] {
            db.create::<Employee>(&object(json!({"name": name, "role": role})))
                .unwrap();
        }

        let bytes = export::<Employee>(&db, &Filters::new().with("role", "medic")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("2,b,medic"));
    }

    #[test]
    fn file_name_includes_filters_and_date() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 14).unwrap();
        assert_eq!(
            file_name(CollectionKind::Employees, &Filters::new(), today),
            "employees_20250814.csv"
        );
        let filters = Filters::new().with("month", "2025-08").with("sector", "شمال");
        assert_eq!(
            file_name(CollectionKind::Shifts, &filters, today),
            "shifts_2025-08_20250814.csv"
        );
    }
}
