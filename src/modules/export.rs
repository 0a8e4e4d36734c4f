use chrono::{DateTime, Utc};
use inflections::Inflect;
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook,
};
use serde_json::Value;
use snafu::ResultExt;

use crate::errors::{CustomResult, ExportSnafu, SerializationSnafu};
use crate::modules::models::race::Race;

const SHEET_NAME: &str = "Races";
const ORDINAL_HEADER: &str = "#";
const SKIPPED_KEYS: [&str; 1] = ["id"];

/// soft pastel fill per column, repeated when there are more columns than colors
const COLUMN_COLORS: [u32; 5] = [0xFFEBEE, 0xE8F5E9, 0xE3F2FD, 0xFFF3E0, 0xF3E5F5];
const MIN_COLUMN_WIDTH: usize = 10;
const COLUMN_PADDING: usize = 2;
const HEADER_HEIGHT: f64 = 25.0;
const ROW_HEIGHT: f64 = 22.0;

/// # a plain table of the races
/// header row and the cell text of every race, before any styling.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub struct RaceExport {}

impl RaceExport {
    /// # build the table
    /// columns come from the first race's fields (minus the id), every other race is
    /// expected to look the same. a 1-based ordinal column goes in front.
    pub fn table(races: &[Race]) -> CustomResult<RaceTable> {
        let records = races
            .iter()
            .map(Self::record)
            .collect::<CustomResult<Vec<serde_json::Map<String, Value>>>>()?;

        let keys: Vec<String> = records
            .first()
            .map(|first| {
                first
                    .keys()
                    .filter(|key| !SKIPPED_KEYS.contains(&key.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let mut headers = vec![ORDINAL_HEADER.to_string()];
        headers.extend(keys.iter().map(|key| Self::format_header(key)));

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut row = vec![(index + 1).to_string()];
                row.extend(keys.iter().map(|key| Self::cell(record.get(key))));
                row
            })
            .collect();

        Ok(RaceTable { headers, rows })
    }

    /// # write the races to an xlsx workbook
    ///
    /// ## Returns
    /// * `Vec<u8>` - the workbook file
    pub fn to_xlsx(races: &[Race]) -> CustomResult<Vec<u8>> {
        let table = Self::table(races)?;

        let mut workbook = Workbook::new();
        // a fixed creation date keeps the output identical for identical races
        let created = ExcelDateTime::from_ymd(2024, 1, 1).context(ExportSnafu)?;
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).context(ExportSnafu)?;

        for (col, header) in table.headers.iter().enumerate() {
            let column = col as u16;
            let cell_format = Self::column_format(col);
            let header_format = cell_format.clone().set_bold().set_font_color(Color::Black);

            worksheet
                .write_string_with_format(0, column, header, &header_format)
                .context(ExportSnafu)?;

            let mut width = MIN_COLUMN_WIDTH.max(header.chars().count());
            for (index, row) in table.rows.iter().enumerate() {
                let text = row.get(col).map(String::as_str).unwrap_or_default();
                let row_number = (index + 1) as u32;

                if col == 0 {
                    let ordinal = (index + 1) as f64;
                    worksheet
                        .write_number_with_format(row_number, column, ordinal, &cell_format)
                        .context(ExportSnafu)?;
                } else {
                    worksheet
                        .write_string_with_format(row_number, column, text, &cell_format)
                        .context(ExportSnafu)?;
                }
                width = width.max(text.chars().count());
            }

            worksheet
                .set_column_width(column, (width + COLUMN_PADDING) as f64)
                .context(ExportSnafu)?;
        }

        worksheet.set_row_height(0, HEADER_HEIGHT).context(ExportSnafu)?;
        for index in 0..table.rows.len() {
            worksheet
                .set_row_height((index + 1) as u32, ROW_HEIGHT)
                .context(ExportSnafu)?;
        }

        workbook.save_to_buffer().context(ExportSnafu)
    }

    /// # header text for a field name
    /// `carClass` becomes `Car Class`
    pub fn format_header(key: &str) -> String {
        key.to_title_case()
    }

    /// the long date used in exports, e.g. `January 5, 2025`
    pub fn format_date(date: &DateTime<Utc>) -> String {
        date.format("%B %-d, %Y").to_string()
    }

    fn record(race: &Race) -> CustomResult<serde_json::Map<String, Value>> {
        let mut record = match serde_json::to_value(race).context(SerializationSnafu)? {
            Value::Object(record) => record,
            _ => serde_json::Map::new(),
        };

        if let Some(date) = record.get_mut("date") {
            *date = Value::String(Self::format_date(&race.date));
        }

        Ok(record)
    }

    fn cell(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn column_format(col: usize) -> Format {
        Format::new()
            .set_background_color(Color::RGB(COLUMN_COLORS[col % COLUMN_COLORS.len()]))
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::RaceExport;
    use crate::modules::models::race::{Race, Surface};

    fn race(id: &str, stage: &str, racenet: Option<&str>) -> Race {
        Race {
            id: id.to_string(),
            country: "Italy".to_string(),
            stage: stage.to_string(),
            car_class: "GT".to_string(),
            car: "911".to_string(),
            surface: Surface::Wet,
            time: "01:23.456".to_string(),
            racenet: racenet.map(str::to_string),
            date: Utc.with_ymd_and_hms(2025, 1, 5, 18, 30, 0).unwrap(),
        }
    }

    #[test]
    fn headers_are_title_cased() {
        assert_eq!(RaceExport::format_header("carClass"), "Car Class");
        assert_eq!(RaceExport::format_header("country"), "Country");
        assert_eq!(RaceExport::format_header("racenet"), "Racenet");
    }

    #[test]
    fn date_is_long_form() {
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(RaceExport::format_date(&date), "January 5, 2025");
    }

    #[test]
    fn table_follows_first_race() {
        let races = vec![
            race("a", "Monza", Some("01:20.000")),
            race("b", "Imola", None),
        ];
        let table = RaceExport::table(&races).unwrap();

        assert_eq!(
            table.headers,
            vec!["#", "Country", "Stage", "Car Class", "Car", "Surface", "Time", "Racenet", "Date"]
        );
        assert_eq!(
            table.rows[0],
            vec![
                "1",
                "Italy",
                "Monza",
                "GT",
                "911",
                "Wet",
                "01:23.456",
                "01:20.000",
                "January 5, 2025"
            ]
        );
        assert_eq!(table.rows[1][0], "2");
        assert_eq!(table.rows[1][7], "");
    }

    #[test]
    fn columns_missing_from_first_race_are_dropped() {
        let races = vec![race("a", "Monza", None), race("b", "Imola", Some("01:20.000"))];
        let table = RaceExport::table(&races).unwrap();

        assert!(!table.headers.contains(&"Racenet".to_string()));
        assert!(table.rows.iter().all(|row| row.len() == table.headers.len()));
    }

    #[test]
    fn workbook_is_reproducible() {
        let races = vec![race("a", "Monza", None)];
        let first = RaceExport::to_xlsx(&races).unwrap();
        let second = RaceExport::to_xlsx(&races).unwrap();

        assert!(first.starts_with(b"PK"));
        assert_eq!(first, second);
    }
}
