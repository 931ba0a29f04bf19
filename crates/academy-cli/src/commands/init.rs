//! The `academy init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create academy.toml
    if std::path::Path::new("academy.toml").exists() {
        println!("academy.toml already exists, skipping.");
    } else {
        std::fs::write("academy.toml", SAMPLE_CONFIG)?;
        println!("Created academy.toml");
    }

    // Create the reference curriculum
    std::fs::create_dir_all("academy-data")?;
    let curriculum_path = std::path::Path::new("academy-data/curriculum.toml");
    if curriculum_path.exists() {
        println!("academy-data/curriculum.toml already exists, skipping.");
    } else {
        std::fs::write(curriculum_path, REFERENCE_CURRICULUM)?;
        println!("Created academy-data/curriculum.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit academy.toml with your server URL and token");
    println!("  2. Run: academy validate");
    println!("  3. Run: academy status");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# academy configuration

data_dir = "./academy-data"
curriculum = "curriculum.toml"

[server]
base_url = "http://localhost:3000"
token = "${ACADEMY_TOKEN}"
timeout_secs = 30

[session]
user_id = "local"
email = "local@academy.invalid"
"#;

const REFERENCE_CURRICULUM: &str = r#"# Niveau 1 reference curriculum.
# Chapters 1 and 2 are mandatory: they gate every later chapter.

[[levels]]
key = "Niveau 1"

[[levels.chapters]]
id = "1"
title = "Santé générale"
mandatory = true

[[levels.chapters.subjects]]
id = "vitamine"
title = "Vitamine"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "mineraux"
title = "Minéraux"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "produits-lipidiques"
title = "Produits Lipidiques"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "proteines"
title = "Protéines"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "collagene"
title = "Collagène"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "2"
title = "Santé Digestive"
mandatory = true

[[levels.chapters.subjects]]
id = "greens"
title = "Greens"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "glutamine"
title = "Glutamine"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "fibres"
title = "Fibres"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "probiotiques"
title = "Probiotiques"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "enzymes-digestives"
title = "Enzymes Digestives"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "3"
title = "Performances Sportives"

[[levels.chapters.subjects]]
id = "bcaa"
title = "BCAA"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "eaa"
title = "EAA"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "electrolytes"
title = "Électrolytes"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "creatine"
title = "Créatine"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "glucides"
title = "Glucides"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "mass-gainers"
title = "Mass Gainers"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "4"
title = "Fat Burner et Pré-Workout"

[[levels.chapters.subjects]]
id = "fat-burner"
title = "Fat Burner"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "pre-workout"
title = "Pré-Workout"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "5"
title = "Suppléments Cognitifs"

[[levels.chapters.subjects]]
id = "neurotransmetteurs"
title = "Les Neurotransmetteurs"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "dopamine"
title = "Dopamine"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "serotonine"
title = "Sérotonine"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "acetylcholine"
title = "Acétylcholine"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "6"
title = "Stress et Sommeil"

[[levels.chapters.subjects]]
id = "sommeil"
title = "Optimisation du Sommeil"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "stress"
title = "Gestion du Stress"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "7"
title = "Gestion Hormonale"

[[levels.chapters.subjects]]
id = "hormones"
title = "Les Hormones"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "oestrogene"
title = "Oestrogène"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "testosterone"
title = "Testostérone"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "thyroide"
title = "Glande Thyroïde"
quiz_ref = "vitamines"

[[levels.chapters]]
id = "8"
title = "Suppléments Spécifiques"

[[levels.chapters.subjects]]
id = "glycemie"
title = "Régulateur de Glycémie"
quiz_ref = "vitamines"

[[levels.chapters.subjects]]
id = "foie"
title = "Détoxifiants pour le Foie"
quiz_ref = "vitamines"
"#;
