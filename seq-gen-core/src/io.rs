use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a text file and returns its entire contents as a `String`.
///
/// Splitting into sequences is left to the caller, since sequence
/// delimiters are configurable and may span line breaks.
pub fn read_to_string<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"bin"` → `data/input.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/names.txt"` → `"names"`
/// - `"names.txt"` → `"names"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() {
			if path.extension() == Some(std::ffi::OsStr::new(extension)) {
				if let Some(name) = path.file_name() {
					files.push(name.to_string_lossy().to_string());
				}
			}
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let output = build_output_path("data/input.txt", "bin").unwrap();
		assert_eq!(output, PathBuf::from("data/input.bin"));
	}

	#[test]
	fn filename_drops_path_and_extension() {
		assert_eq!(get_filename("./data/names.txt").unwrap(), "names");
		assert_eq!(get_filename("names.txt").unwrap(), "names");
	}

	#[test]
	fn list_files_filters_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("names.txt"), "a").unwrap();
		std::fs::write(dir.path().join("names.bin"), "b").unwrap();
		std::fs::write(dir.path().join("words.txt"), "c").unwrap();

		let mut files = list_files(dir.path(), "txt").unwrap();
		files.sort();
		assert_eq!(files, vec!["names.txt".to_owned(), "words.txt".to_owned()]);
	}
}
