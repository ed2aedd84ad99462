// src/noyau/alphabet.rs
//
// Tables statiques du noyau (aucun état global mutable) :
// - opérateurs reconnus
// - déclencheur de variable par défaut
// - palette de parenthèses par défaut (couleurs par profondeur)

/// Les quatre opérateurs binaires (et `-` unaire).
pub const OPERATEURS: [char; 4] = ['+', '-', '*', '/'];

/// Glyphe qui ouvre le sélecteur de variables (configurable via le catalogue).
pub const DECLENCHEUR_DEFAUT: char = '@';

/// Palette par défaut (#RRGGBBAA), indexée par `profondeur mod longueur`.
pub const PALETTE_DEFAUT: [&str; 5] = [
    "#409EFFCC", // bleu
    "#67C23ACC", // vert
    "#E6A23CCC", // orange
    "#8E44ADCC", // violet
    "#16A085CC", // cyan
];

pub fn est_operateur(c: char) -> bool {
    OPERATEURS.contains(&c)
}

pub fn est_parenthese(c: char) -> bool {
    c == '(' || c == ')'
}

/// Caractère qui peut continuer un identifiant (sert aux frontières de variables).
pub fn est_identifiant(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Jeu de caractères que la saisie accepte au clavier (hors déclencheur).
pub fn est_reconnu(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || est_operateur(c) || est_parenthese(c)
}
