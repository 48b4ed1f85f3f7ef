//! Journal Codec
//!
//! The journal is an append-only text log. It starts with a five line
//! header followed by one record per line:
//!
//! ```text
//! libcore.io.DiskLruCache
//! 1
//! 100
//! 2
//!
//! CLEAN 3400330d1dfc7f3f7f4b8d4d803dfcf6 832 21054
//! DIRTY 335c4c6028171cfddfbaae1a9c313c52
//! CLEAN 335c4c6028171cfddfbaae1a9c313c52 3934 2342
//! REMOVE 335c4c6028171cfddfbaae1a9c313c52
//! DIRTY 1ab96a171faeeee38496d8b330771a7a
//! CLEAN 1ab96a171faeeee38496d8b330771a7a 1600 234
//! READ 335c4c6028171cfddfbaae1a9c313c52
//! READ 3400330d1dfc7f3f7f4b8d4d803dfcf6
//! ```
//!
//! The header carries the magic string, the format version, the
//! application version and the number of value slots per entry.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use super::entry::validate_key;
use super::line_reader::StrictLineReader;
use crate::error::{Error, Result};

/// Live journal file name
pub const JOURNAL_FILE: &str = "journal";
/// Rebuild target
pub const JOURNAL_FILE_TEMP: &str = "journal.tmp";
/// Previous journal kept until a rebuild swap completes
pub const JOURNAL_FILE_BACKUP: &str = "journal.bkp";
/// First header line
pub const MAGIC: &str = "libcore.io.DiskLruCache";
/// Journal format version
pub const VERSION_1: &str = "1";

const CLEAN: &str = "CLEAN";
const DIRTY: &str = "DIRTY";
const REMOVE: &str = "REMOVE";
const READ: &str = "READ";

/// Journal header values supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    /// Application version; a change invalidates the whole cache
    pub app_version: u32,
    /// Value slots per entry
    pub value_count: usize,
}

impl JournalHeader {
    /// Write the five header lines
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write!(
            w,
            "{}\n{}\n{}\n{}\n\n",
            MAGIC, VERSION_1, self.app_version, self.value_count
        )
    }

    /// Read and check the five header lines
    pub fn read_from<R: Read>(&self, reader: &mut StrictLineReader<R>) -> Result<()> {
        let mut lines = Vec::with_capacity(5);
        for _ in 0..5 {
            match reader.read_line()? {
                Some(line) => lines.push(line),
                None => {
                    return Err(Error::CorruptJournal(format!(
                        "truncated header: {:?}",
                        lines
                    )))
                }
            }
        }
        if lines[0] != MAGIC
            || lines[1] != VERSION_1
            || lines[2] != self.app_version.to_string()
            || lines[3] != self.value_count.to_string()
            || !lines[4].is_empty()
        {
            return Err(Error::CorruptJournal(format!(
                "unexpected header: {:?}",
                lines
            )));
        }
        Ok(())
    }
}

/// One journal record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// An edit started
    Dirty(String),
    /// An edit was published with these slot lengths
    Clean { key: String, lengths: Vec<u64> },
    /// The entry was deleted
    Remove(String),
    /// The entry was read
    Read(String),
}

impl Record {
    /// Parse a record line; `value_count` fixes the arity of `CLEAN`
    pub fn parse(line: &str, value_count: usize) -> Result<Record> {
        let corrupt = || Error::CorruptJournal(format!("unexpected journal line: {}", line));

        let (op, rest) = line.split_once(' ').ok_or_else(corrupt)?;
        let (key, tail) = match rest.split_once(' ') {
            Some((key, tail)) => (key, Some(tail)),
            None => (rest, None),
        };
        validate_key(key).map_err(|_| corrupt())?;
        let key = key.to_string();

        match (op, tail) {
            (CLEAN, Some(tail)) => {
                let lengths = tail
                    .split(' ')
                    .map(|part| part.parse::<u64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| corrupt())?;
                if lengths.len() != value_count {
                    return Err(corrupt());
                }
                Ok(Record::Clean { key, lengths })
            }
            (DIRTY, None) => Ok(Record::Dirty(key)),
            (REMOVE, None) => Ok(Record::Remove(key)),
            (READ, None) => Ok(Record::Read(key)),
            _ => Err(corrupt()),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Dirty(key) => write!(f, "{} {}", DIRTY, key),
            Record::Remove(key) => write!(f, "{} {}", REMOVE, key),
            Record::Read(key) => write!(f, "{} {}", READ, key),
            Record::Clean { key, lengths } => {
                write!(f, "{} {}", CLEAN, key)?;
                for len in lengths {
                    write!(f, " {}", len)?;
                }
                Ok(())
            }
        }
    }
}

/// Buffered appender for the live journal
pub struct JournalWriter {
    out: BufWriter<File>,
}

impl JournalWriter {
    /// Open an existing journal for appending
    pub fn open_append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Create a journal containing a header and the given records, then sync it
    pub fn write_fresh<'a>(
        path: &Path,
        header: &JournalHeader,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        header.write_to(&mut out)?;
        for record in records {
            writeln!(out, "{}", record)?;
        }
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    /// Append one record (buffered)
    pub fn append(&mut self, record: &Record) -> Result<()> {
        writeln!(self.out, "{}", record)?;
        Ok(())
    }

    /// Push buffered records to the file
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::line_reader::Charset;
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn header() -> JournalHeader {
        JournalHeader {
            app_version: 100,
            value_count: 2,
        }
    }

    #[test]
    fn test_parse_records() {
        assert_eq!(
            Record::parse("CLEAN k1 832 21054", 2).unwrap(),
            Record::Clean {
                key: "k1".into(),
                lengths: vec![832, 21054]
            }
        );
        assert_eq!(Record::parse("DIRTY k1", 2).unwrap(), Record::Dirty("k1".into()));
        assert_eq!(Record::parse("REMOVE k1", 2).unwrap(), Record::Remove("k1".into()));
        assert_eq!(Record::parse("READ k1", 2).unwrap(), Record::Read("k1".into()));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for line in [
            "",
            "CLEAN",
            "CLEAN k1",
            "CLEAN k1 1",
            "CLEAN k1 1 2 3",
            "CLEAN k1 1 x",
            "CLEAN k1 -1 2",
            "DIRTY k1 5",
            "REMOVE k1 5",
            "READ k1 5",
            "BOGUS k1",
            "DIRTY Bad_Key",
        ] {
            assert_matches!(
                Record::parse(line, 2),
                Err(Error::CorruptJournal(_)),
                "line {:?} should be corrupt",
                line
            );
        }
    }

    #[test]
    fn test_display_matches_parse() {
        let record = Record::Clean {
            key: "abc".into(),
            lengths: vec![5, 0],
        };
        assert_eq!(record.to_string(), "CLEAN abc 5 0");
        assert_eq!(Record::parse(&record.to_string(), 2).unwrap(), record);
        assert_eq!(Record::Read("abc".into()).to_string(), "READ abc");
    }

    #[test]
    fn test_header_check() {
        let mut bytes = Vec::new();
        header().write_to(&mut bytes).unwrap();
        assert_eq!(bytes, b"libcore.io.DiskLruCache\n1\n100\n2\n\n");

        let mut reader = StrictLineReader::new(Cursor::new(bytes.clone()), Charset::UsAscii).unwrap();
        header().read_from(&mut reader).unwrap();

        let other = JournalHeader {
            app_version: 101,
            value_count: 2,
        };
        let mut reader = StrictLineReader::new(Cursor::new(bytes), Charset::UsAscii).unwrap();
        assert_matches!(other.read_from(&mut reader), Err(Error::CorruptJournal(_)));
    }

    #[test]
    fn test_header_rejects_non_blank_fifth_line() {
        let data = b"libcore.io.DiskLruCache\n1\n100\n2\nx\n".to_vec();
        let mut reader = StrictLineReader::new(Cursor::new(data), Charset::UsAscii).unwrap();
        assert_matches!(header().read_from(&mut reader), Err(Error::CorruptJournal(_)));
    }

    #[test]
    fn test_header_rejects_truncation() {
        let data = b"libcore.io.DiskLruCache\n1\n".to_vec();
        let mut reader = StrictLineReader::new(Cursor::new(data), Charset::UsAscii).unwrap();
        assert_matches!(header().read_from(&mut reader), Err(Error::CorruptJournal(_)));
    }

    #[test]
    fn test_writer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(JOURNAL_FILE);
        let records = vec![
            Record::Dirty("a".into()),
            Record::Clean {
                key: "b".into(),
                lengths: vec![1, 2],
            },
        ];
        JournalWriter::write_fresh(&path, &header(), &records).unwrap();

        let mut writer = JournalWriter::open_append(&path).unwrap();
        writer.append(&Record::Read("b".into())).unwrap();
        writer.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "libcore.io.DiskLruCache\n1\n100\n2\n\nDIRTY a\nCLEAN b 1 2\nREAD b\n"
        );
    }
}
