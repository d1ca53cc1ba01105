use seq_gen_core::sequence::analyzer::SequenceAnalyzer;
use seq_gen_core::sequence::assembler::SequenceAssembler;
use seq_gen_core::sequence::text_generator::{TextGenerator, parse_bounds};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A small training corpus; every sequence here carries the same weight
    let words = [
        "mistral", "sirocco", "zephyr", "monsoon", "typhoon", "cyclone",
        "tornado", "tempest", "breeze", "squall", "gale", "chinook",
        "harmattan", "levante", "ponente", "tramontane",
    ];
    let word_frequencies: Vec<(String, f64)> = words.iter().map(|w| ((*w).to_owned(), 1.0)).collect();
    let analyzer = SequenceAnalyzer::new(&word_frequencies)?;

    // Bounds select which n-grams may be used:
    // every 2-gram of a generated word must sit in the 0-100 frequency
    // percentile window (i.e. appear somewhere in the corpus), and the same
    // for every 3-gram
    let bounds = parse_bounds(&["2:0,100", "3:0,100"])?;

    // Bound strings must be <LENGTH>:<LOWER>,<UPPER> with lower < upper
    match parse_bounds(&["3:70,30"]) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Bounds '3:70,30' are invalid: {}", e),
    }

    // Only word lengths appearing in the corpus can be generated
    let generator = TextGenerator::new(&bounds, &analyzer)?;

    // Generate 10 random words; 'unique' filters out corpus words and
    // duplicates, so fewer than 10 may come back
    let mut rng = rand::rng();
    for (i, word) in generator.random_texts(10, true, &mut rng).iter().enumerate() {
        println!("Generated word {}: {}", i + 1, word);
    }

    // Every producible 7-letter word, made from one 4-gram glued to one
    // 4-gram glued to one 4-gram with the overlaps collapsed
    let assembler = SequenceAssembler::new(
        7,
        &analyzer.ngrams_leading(4, 0.0, 100.0)?,
        &analyzer.ngrams(4, 0.0, 100.0)?,
        &analyzer.ngrams_trailing(4, 0.0, 100.0)?,
    )?;
    if assembler.is_disconnected() {
        println!("No 7-letter word can be assembled from 4-grams");
    } else {
        for word in assembler.all_sequences()?.take(10) {
            println!("Assembled: {}", word);
        }
    }

    // Narrow windows can select n-gram sets that connect to nothing; that
    // surfaces as an empty generator, not as an error
    let narrow = parse_bounds(&["2:95,100"])?;
    let narrow_generator = TextGenerator::new(&narrow, &analyzer)?;
    if narrow_generator.is_empty() {
        println!("The 95-100 window selects too few 2-grams to build words");
    }

    Ok(())
}
