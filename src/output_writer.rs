use anyhow::anyhow;
use formatx::formatx;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::str::from_utf8;
use std::sync::Arc;

/// Destination of the result files of a scenario run, one per location key.
pub trait OutputWriter: Debug + Sync + Send {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether writing can be skipped altogether.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to a file in a directory, named from a template
/// taking the location key and the file extension.
#[derive(Debug)]
pub struct FileOutputWriter {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutputWriter {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_name(&self, location_key: &str, file_extension: &str) -> anyhow::Result<String> {
        formatx!(&self.file_template, location_key, file_extension)
            .map_err(|e| anyhow!("invalid output file template '{}': {e}", self.file_template))
    }
}

impl OutputWriter for FileOutputWriter {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = self.file_name(location_key, file_extension)?;

        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl OutputWriter for &FileOutputWriter {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutputWriter as OutputWriter>::writer_for_location_key(
            self,
            location_key,
            file_extension,
        )
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutputWriter;

impl OutputWriter for SinkOutputWriter {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Collects every "file" into one shared string, each preceded by a header
/// naming it, for callers that want the results in memory.
#[derive(Clone, Debug, Default)]
pub struct StringOutputWriter(Arc<Mutex<String>>);

impl StringOutputWriter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contents(&self) -> String {
        self.0.lock().clone()
    }
}

impl OutputWriter for StringOutputWriter {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(FileLikeStringWriter {
            string: self.0.clone(),
            name: format!("{location_key}.{file_extension}"),
            has_header: false,
        })
    }
}

impl OutputWriter for &StringOutputWriter {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <StringOutputWriter as OutputWriter>::writer_for_location_key(
            self,
            location_key,
            file_extension,
        )
    }
}

/// One "file" within the string of a [`StringOutputWriter`].
struct FileLikeStringWriter {
    string: Arc<Mutex<String>>,
    name: String,
    has_header: bool,
}

impl Write for FileLikeStringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = from_utf8(buf)
            .map_err(|_| io::Error::new(ErrorKind::InvalidData, "Tried to write out invalid UTF-8."))?;
        let mut string = self.string.lock();
        if !self.has_header {
            if !string.is_empty() {
                string.push('\n');
            }
            string.push_str(&format!("# {}\n", self.name));
            self.has_header = true;
        }
        string.push_str(utf8);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_collect_files_in_order_with_headers() {
        let output = StringOutputWriter::new();
        output
            .writer_for_location_key("results", "csv")
            .unwrap()
            .write_all(b"a,b\n1,2\n")
            .unwrap();
        output
            .writer_for_location_key("summary", "txt")
            .unwrap()
            .write_all(b"done\n")
            .unwrap();

        assert_eq!(
            output.contents(),
            "# results.csv\na,b\n1,2\n\n# summary.txt\ndone\n"
        );
    }

    #[rstest]
    fn should_refuse_invalid_utf8() {
        let output = StringOutputWriter::new();
        let mut writer = output.writer_for_location_key("results", "csv").unwrap();

        assert!(writer.write(&[0xff, 0xfe]).is_err());
        assert_eq!(output.contents(), "");
    }

    #[rstest]
    fn should_name_files_from_template() {
        let output = FileOutputWriter::new(PathBuf::from("."), "run__{}.{}".to_string());

        assert_eq!(output.file_name("results", "csv").unwrap(), "run__results.csv");
        assert!(SinkOutputWriter.is_noop());
        assert!(!output.is_noop());
    }
}
