// src/noyau/jetons.rs
//
// Classification du texte en jetons (empans typés).
// - couverture totale de [0, len) : ni trou, ni chevauchement
// - positions en caractères (pas en octets)
// - échec "doux" : un caractère inconnu devient un jeton Invalide
//
// Priorité à chaque position :
//   1) variable la plus longue (nom en affichage, code en canonique), à une frontière d'identifiant
//   2) nombre : chiffres+ ('.' chiffres+)?
//   3) opérateur / parenthèse (un caractère)
//   4) déclencheur isolé (choix de variable en attente)
//   5) sinon : Invalide (un caractère)

use super::alphabet::{est_identifiant, est_operateur, est_parenthese};
use super::variables::Catalogue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Genre {
    Nombre,
    Operateur,
    Parenthese,
    Variable,
    Declencheur,
    Invalide,
}

/// Statut d'une parenthèse après appariement (voir parentheses.rs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtatParenthese {
    /// `partenaire` = indice du jeton associé dans la même suite.
    Appariee { profondeur: usize, partenaire: usize },
    Orpheline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jeton {
    pub genre: Genre,
    pub texte: String,
    pub debut: usize,
    pub fin: usize,
    /// Indice dans le catalogue (jetons Variable seulement).
    pub variable: Option<usize>,
    pub parenthese: Option<EtatParenthese>,
}

impl Jeton {
    fn new(genre: Genre, chars: &[char], debut: usize, fin: usize) -> Self {
        Self {
            genre,
            texte: chars[debut..fin].iter().collect(),
            debut,
            fin,
            variable: None,
            parenthese: None,
        }
    }

    pub fn premier(&self) -> Option<char> {
        self.texte.chars().next()
    }

    /// Nombre ou variable : unité qu'on ne coupe pas au déplacement.
    pub fn est_atomique(&self) -> bool {
        matches!(self.genre, Genre::Nombre | Genre::Variable)
    }

    pub fn est_ouvrante(&self) -> bool {
        self.genre == Genre::Parenthese && self.texte == "("
    }

    pub fn est_fermante(&self) -> bool {
        self.genre == Genre::Parenthese && self.texte == ")"
    }

    pub fn contient(&self, position: usize) -> bool {
        self.debut <= position && position < self.fin
    }
}

/// Quel côté du catalogue reconnaître.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cote {
    /// Texte d'affichage : noms lisibles.
    Noms,
    /// Texte canonique : codes opaques.
    Codes,
}

/// Classe un texte d'affichage (variables reconnues par leur nom).
pub fn classify(texte: &str, catalogue: &Catalogue) -> Vec<Jeton> {
    scan(texte, catalogue, Cote::Noms)
}

/// Classe un texte canonique (variables reconnues par leur code).
pub fn classify_canonical(texte: &str, catalogue: &Catalogue) -> Vec<Jeton> {
    scan(texte, catalogue, Cote::Codes)
}

fn scan(texte: &str, catalogue: &Catalogue, cote: Cote) -> Vec<Jeton> {
    let chars: Vec<char> = texte.chars().collect();
    let mut out = Vec::new();
    let mut i: usize = 0;

    while i < chars.len() {
        // Variables d'abord (le nom peut contenir des chiffres ou le déclencheur).
        if let Some((index, n)) = variable_en(&chars, i, catalogue, cote) {
            let mut j = Jeton::new(Genre::Variable, &chars, i, i + n);
            j.variable = Some(index);
            out.push(j);
            i += n;
            continue;
        }

        let c = chars[i];

        if c.is_ascii_digit() {
            let fin = fin_nombre(&chars, i);
            out.push(Jeton::new(Genre::Nombre, &chars, i, fin));
            i = fin;
            continue;
        }

        let genre = if est_operateur(c) {
            Genre::Operateur
        } else if est_parenthese(c) {
            Genre::Parenthese
        } else if c == catalogue.declencheur() {
            Genre::Declencheur
        } else {
            Genre::Invalide
        };
        out.push(Jeton::new(genre, &chars, i, i + 1));
        i += 1;
    }

    out
}

/// chiffres+ ('.' chiffres+)? à partir de `debut` (qui est un chiffre).
fn fin_nombre(chars: &[char], debut: usize) -> usize {
    let mut i = debut;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // partie décimale seulement si au moins un chiffre suit le point
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

/// Variable la plus longue qui commence en `i` (le catalogue donne l'ordre décroissant).
/// Renvoie (indice catalogue, longueur en caractères).
fn variable_en(chars: &[char], i: usize, catalogue: &Catalogue, cote: Cote) -> Option<(usize, usize)> {
    for (index, motif) in catalogue.motifs(cote) {
        let fin = i + motif.len();
        if fin > chars.len() || chars[i..fin] != *motif {
            continue;
        }
        if frontiere_ok(chars, i, fin, motif) {
            return Some((index, motif.len()));
        }
    }
    None
}

/// Refuse une correspondance qui prolongerait un identifiant voisin
/// (ex: code "v1" dans "v12", ou "rev" dans "prev").
pub(crate) fn frontiere_ok(chars: &[char], debut: usize, fin: usize, motif: &[char]) -> bool {
    let colle_avant = debut > 0
        && motif.first().is_some_and(|&c| est_identifiant(c))
        && est_identifiant(chars[debut - 1]);
    let colle_apres = fin < chars.len()
        && motif.last().is_some_and(|&c| est_identifiant(c))
        && est_identifiant(chars[fin]);
    !colle_avant && !colle_apres
}

/// Format utilitaire (démarche) : jetons séparés par des espaces.
pub fn format_jetons(jetons: &[Jeton]) -> String {
    jetons
        .iter()
        .map(|j| match j.genre {
            Genre::Invalide => format!("?{}", j.texte),
            _ => j.texte.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::variables::{Catalogue, Variable};
    use pretty_assertions::assert_eq;

    fn catalogue() -> Catalogue {
        Catalogue::new(vec![
            Variable::new("@Revenue", "rev"),
            Variable::new("@Cost", "cost"),
            Variable::new("@RevenueNet", "revnet"),
        ])
        .unwrap()
    }

    fn genres(jetons: &[Jeton]) -> Vec<Genre> {
        jetons.iter().map(|j| j.genre).collect()
    }

    fn textes(jetons: &[Jeton]) -> Vec<&str> {
        jetons.iter().map(|j| j.texte.as_str()).collect()
    }

    #[test]
    fn couverture_sans_trou() {
        let texte = "12.5*(@Revenue-3)/x";
        let jetons = classify(texte, &catalogue());
        let mut attendu = 0;
        for j in &jetons {
            assert_eq!(j.debut, attendu);
            assert!(j.fin > j.debut);
            attendu = j.fin;
        }
        assert_eq!(attendu, texte.chars().count());
    }

    #[test]
    fn nombres_operateurs_parentheses() {
        let jetons = classify("3+(4.25*2)", &Catalogue::vide());
        assert_eq!(textes(&jetons), vec!["3", "+", "(", "4.25", "*", "2", ")"]);
        assert_eq!(
            genres(&jetons),
            vec![
                Genre::Nombre,
                Genre::Operateur,
                Genre::Parenthese,
                Genre::Nombre,
                Genre::Operateur,
                Genre::Nombre,
                Genre::Parenthese,
            ]
        );
    }

    #[test]
    fn point_sans_chiffre_apres() {
        let jetons = classify("3.", &Catalogue::vide());
        assert_eq!(textes(&jetons), vec!["3", "."]);
        assert_eq!(genres(&jetons), vec![Genre::Nombre, Genre::Invalide]);
    }

    #[test]
    fn variable_la_plus_longue_gagne() {
        let jetons = classify("@RevenueNet+@Revenue", &catalogue());
        assert_eq!(textes(&jetons), vec!["@RevenueNet", "+", "@Revenue"]);
        assert_eq!(jetons[0].variable, Some(2));
        assert_eq!(jetons[2].variable, Some(0));
    }

    #[test]
    fn codes_en_canonique() {
        let jetons = classify_canonical("revnet*cost", &catalogue());
        assert_eq!(textes(&jetons), vec!["revnet", "*", "cost"]);
        assert_eq!(jetons[0].variable, Some(2));
        assert_eq!(jetons[2].variable, Some(1));
    }

    #[test]
    fn frontiere_d_identifiant() {
        // "prev" ne contient pas le code "rev"
        let jetons = classify_canonical("prev", &catalogue());
        assert!(jetons.iter().all(|j| j.genre == Genre::Invalide));
        assert_eq!(jetons.len(), 4);
    }

    #[test]
    fn declencheur_isole_et_positions_en_caracteres() {
        let cat = Catalogue::new(vec![Variable::new("@收入", "income")]).unwrap();
        let jetons = classify("@收入+@", &cat);
        assert_eq!(genres(&jetons), vec![Genre::Variable, Genre::Operateur, Genre::Declencheur]);
        assert_eq!((jetons[0].debut, jetons[0].fin), (0, 3));
        assert_eq!((jetons[2].debut, jetons[2].fin), (4, 5));
    }

    #[test]
    fn format_demarche() {
        let jetons = classify("1+a", &Catalogue::vide());
        assert_eq!(format_jetons(&jetons), "1 + ?a");
    }
}
