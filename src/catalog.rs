//! Built-in department catalog.

use crate::result::Department;

const DEPARTMENTS: &[(&str, &str)] = &[
    (
        "Ciência da Computação",
        "https://www2.ufjf.br/deptocomputacao/institucional/corpo-docente/docentes/",
    ),
    ("Estatística", "https://www2.ufjf.br/estatistica/cursos/docentes/"),
    ("Física", "https://www2.ufjf.br/fisica/institucional/docentes/"),
    (
        "Matemática",
        "https://www2.ufjf.br/mat/institucional/corpo-docente/docentes/",
    ),
    ("Química", "https://www2.ufjf.br/quimica/institucional/docentes/"),
];

/// All known departments, in display order.
#[must_use]
pub fn departments() -> Vec<Department> {
    DEPARTMENTS
        .iter()
        .map(|(name, url)| Department::new(*name, *url))
        .collect()
}

/// Look a department up by name, ignoring case and surrounding whitespace.
#[must_use]
pub fn find(name: &str) -> Option<Department> {
    let wanted = name.trim().to_lowercase();
    DEPARTMENTS
        .iter()
        .find(|(candidate, _)| candidate.to_lowercase() == wanted)
        .map(|(name, url)| Department::new(*name, *url))
}

/// Look a department up by its canonical URL.
#[must_use]
pub fn find_by_url(url: &str) -> Option<Department> {
    let url = url.trim();
    DEPARTMENTS
        .iter()
        .find(|(_, candidate)| *candidate == url)
        .map(|(name, url)| Department::new(*name, *url))
}
