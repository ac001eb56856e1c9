use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let attributes = Path::new("data/movies_features.txt");
    let ratings = Path::new("data/ranks_matrix.txt");

    println!("Loading movie attributes and ratings...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(attributes, ratings)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (users, movies, rated) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Movies: {}", movies);
    println!("Attributes per movie: {}", index.num_attributes());
    println!("Rated slots: {}", rated);
    println!("\nDensity: {:.1}%",
             100.0 * rated as f64 / (users * movies).max(1) as f64);
}
