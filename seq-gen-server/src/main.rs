use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use log::info;
use serde::Deserialize;

use seq_gen_core::io::list_files;
use seq_gen_core::sequence::analyzer::{CorpusFormat, SequenceAnalyzer};
use seq_gen_core::sequence::text_generator::{TextGenerator, parse_bounds};

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	/// Bound strings separated by ';', e.g. "2:0,100;3:25,75"
	bounds: Option<String>,
	num: Option<usize>,
	unique: Option<bool>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
}

struct SharedData {
	analyzer: Option<SequenceAnalyzer>,
	corpus_names: Vec<String>,
	/// Last generator, keyed by its bounds string so repeated requests with
	/// the same bounds skip the rebuild.
	generator: Option<(String, TextGenerator)>,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates random texts from the loaded corpora based on query parameters.
/// Returns the generated texts as the response body, one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let bounds_string = query.bounds.clone().unwrap_or_else(|| "3:0,100".to_owned());
	let num = query.num.unwrap_or(1);
	let unique = query.unique.unwrap_or(false);

	let bound_strings: Vec<&str> = bounds_string.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
	let bounds = match parse_bounds(&bound_strings) {
		Ok(b) => b,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	let Some(analyzer) = &shared_data.analyzer else {
		return HttpResponse::BadRequest().body("No corpora loaded");
	};

	// rebuild the generator only when the bounds change
	let rebuild = !matches!(&shared_data.generator, Some((key, _)) if *key == bounds_string);
	if rebuild {
		let generator = match TextGenerator::new(&bounds, analyzer) {
			Ok(g) => g,
			Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
		};
		shared_data.generator = Some((bounds_string, generator));
	}
	// just built or verified above
	let (_, generator) = shared_data.generator.as_ref().unwrap();

	if generator.is_empty() {
		return HttpResponse::BadRequest().body("Bounds select no usable n-grams for the loaded corpora");
	}
	let texts = generator.random_texts(num, unique, &mut rand::rng());
	HttpResponse::Ok().body(texts.join("\n"))
}

#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files("./data", "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};
	HttpResponse::Ok().body(shared_data.corpus_names.join("\n"))
}

#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let corpus_names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	let mut analyzers = Vec::with_capacity(corpus_names.len());
	for name in &corpus_names {
		let corpus_path = format!("./data/{}.txt", name);
		match SequenceAnalyzer::from_corpus_file(corpus_path, &CorpusFormat::default()) {
			Ok(a) => analyzers.push(a),
			Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
		}
	}

	// every corpus carries the same weight regardless of size
	match SequenceAnalyzer::merge_normalized(&analyzers) {
		Ok(merged) => shared_data.analyzer = Some(merged),
		Err(e) => return HttpResponse::BadRequest().body(format!("Failed to merge corpora: {e}")),
	}
	shared_data.corpus_names = corpus_names.into_iter().map(str::to_owned).collect();
	shared_data.generator = None;

	HttpResponse::Ok().body("Corpora loaded successfully")
}

/// Main entry point for the server.
///
/// Starts an Actix-web HTTP server with no corpora loaded; corpora are
/// loaded through `/v1/load_corpora` and shared behind a `Mutex`.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Currently, the corpus directory is hardcoded to ./data.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		analyzer: None,
		corpus_names: Vec::new(),
		generator: None,
	};
	let shared_generator = web::Data::new(Mutex::new(shared_data));

	info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_generator.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(put_corpora)
			.service(get_loaded_corpora)
	})
	.bind(("127.0.0.1", 5000))?
	.run()
	.await
}
