use std::{fs, io::Write, path::Path};

use crate::{
    error::{Result, WeatherError},
    model::WeatherRecord,
};

/// Writes the `field: value` listing, one field per line.
pub fn write_console<W: Write>(record: &WeatherRecord, out: &mut W) -> Result<()> {
    writeln!(out, "{record}").map_err(|source| WeatherError::OutputWrite {
        target: "standard output".to_string(),
        source,
    })
}

/// Writes a header row and a single data row to `out`.
pub fn write_csv<W: Write>(record: &WeatherRecord, out: W) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

/// Writes `record` to `path` as CSV, replacing any previous contents.
///
/// The whole document is serialized before the file is touched, so a failed
/// serialization leaves an existing file as it was.
pub fn save_csv(record: &WeatherRecord, path: &Path) -> Result<()> {
    let to_error = |source: std::io::Error| WeatherError::OutputWrite {
        target: path.display().to_string(),
        source,
    };

    let mut buf = Vec::new();
    write_csv(record, &mut buf).map_err(|e| to_error(e.into()))?;
    fs::write(path, buf).map_err(to_error)?;

    tracing::info!("Saved weather data to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherRecord {
        WeatherRecord {
            city: "Wroclaw".into(),
            date: "2020-01-01".into(),
            max_temperature: 5.3,
            min_temperature: -1.2,
            rain_sum: 0.4,
            max_wind_speed: 14.8,
        }
    }

    #[test]
    fn csv_has_header_and_one_row() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "city,date,max_temperature,min_temperature,rain_sum,max_wind_speed",
                "Wroclaw,2020-01-01,5.3,-1.2,0.4,14.8",
            ]
        );
    }

    #[test]
    fn csv_quotes_city_with_comma() {
        let record = WeatherRecord {
            city: "Paris, TX".into(),
            ..sample()
        };
        let mut buf = Vec::new();
        write_csv(&record, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("\"Paris, TX\","));
    }

    #[test]
    fn console_output_ends_with_newline() {
        let mut buf = Vec::new();
        write_console(&sample(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("city: Wroclaw\n"));
        assert!(text.ends_with("max_wind_speed: 14.8\n"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn save_csv_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_data.csv");
        std::fs::write(&path, "stale\nrows\nfrom\nan\nolder\nrun\n").unwrap();

        save_csv(&sample(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "city,date,max_temperature,min_temperature,rain_sum,max_wind_speed\n\
             Wroclaw,2020-01-01,5.3,-1.2,0.4,14.8\n"
        );
    }

    #[test]
    fn save_csv_onto_directory_fails_without_touching_it() {
        let dir = tempfile::tempdir().unwrap();

        let err = save_csv(&sample(), dir.path()).unwrap_err();
        assert!(matches!(err, WeatherError::OutputWrite { .. }));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn save_csv_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.csv");

        let err = save_csv(&sample(), &path).unwrap_err();
        assert!(matches!(err, WeatherError::OutputWrite { .. }));
        assert!(err.to_string().contains("out.csv"));
    }
}
