//! # Registros Rotulados (JSON / JSONL)
//!
//! Formato de intercâmbio: cada registro é um objeto com exatamente os campos
//! `text` (texto original) e `labels` (tags BIO separadas por espaço).
//! Coleções são um array JSON ou um objeto por linha (JSONL).
//!
//! ```json
//! [{"text": "sales in 2019", "labels": "O O B-YEAR"}]
//! ```
//!
//! A conversão é com perda: campos extras de um registro lido são descartados,
//! então `load` seguido de `save` grava só `text` e `labels`.
//!
//! Registros sem algum dos campos são rejeitados no carregamento com
//! [`NerError::RecordFormatInvalid`], indicando o índice do elemento (JSON,
//! base 0) ou o número da linha (JSONL, base 1).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NerError, Result};

/// Um texto e suas tags BIO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    pub labels: String,
}

/// Formato de arquivo de registros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    Json,
    Jsonl,
}

impl RecordFormat {
    /// `.jsonl` → JSONL; qualquer outra extensão → JSON.
    pub fn infer_from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => RecordFormat::Jsonl,
            _ => RecordFormat::Json,
        }
    }
}

pub fn save_json(records: &[Record], path: &Path, pretty: bool) -> Result<()> {
    let file = File::create(path).map_err(|e| NerError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, records)
    } else {
        serde_json::to_writer(&mut writer, records)
    };
    written.map_err(|source| NerError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| NerError::io(path, e))
}

pub fn load_json(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| NerError::io(path, e))?;
    let root: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| NerError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let Value::Array(items) = root else {
        return Err(NerError::RecordFormatInvalid {
            path: path.to_path_buf(),
            position: 0,
            message: "JSON root must be a list of {text, labels} objects".into(),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            to_record(item).ok_or_else(|| NerError::RecordFormatInvalid {
                path: path.to_path_buf(),
                position: i,
                message: format!("item {i} must be an object with 'text' and 'labels'"),
            })
        })
        .collect()
}

pub fn save_jsonl(records: &[Record], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| NerError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(|source| NerError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(|e| NerError::io(path, e))?;
    }
    writer.flush().map_err(|e| NerError::io(path, e))
}

pub fn load_jsonl(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| NerError::io(path, e))?;
    let mut records = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line_num = i + 1;
        let line = line.map_err(|e| NerError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| NerError::RecordFormatInvalid {
            path: path.to_path_buf(),
            position: line_num,
            message: format!("line {line_num}: {e}"),
        })?;
        let record = to_record(value).ok_or_else(|| NerError::RecordFormatInvalid {
            path: path.to_path_buf(),
            position: line_num,
            message: format!("line {line_num}: must be an object with 'text' and 'labels'"),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Carrega no formato indicado.
pub fn load(path: &Path, format: RecordFormat) -> Result<Vec<Record>> {
    match format {
        RecordFormat::Json => load_json(path),
        RecordFormat::Jsonl => load_jsonl(path),
    }
}

/// Salva no formato indicado; `pretty` só vale para JSON.
pub fn save(records: &[Record], path: &Path, format: RecordFormat, pretty: bool) -> Result<()> {
    match format {
        RecordFormat::Json => save_json(records, path, pretty),
        RecordFormat::Jsonl => save_jsonl(records, path),
    }
}

fn to_record(value: Value) -> Option<Record> {
    let Value::Object(map) = value else {
        return None;
    };
    let text = map.get("text")?.as_str()?.to_string();
    let labels = map.get("labels")?.as_str()?.to_string();
    Some(Record { text, labels })
}
