//! Noyau : variables, catalogue et substitution nom ↔ code
//!
//! Contrats :
//! - `to_canonical(to_display(c)) == c` pour tout texte canonique `c`
//!   (catalogue valide = précondition de non-chevauchement vérifiée à la construction).
//! - Substitution par empans (sortie du classifieur), jamais par remplacement de
//!   sous-chaîne : un code ne peut pas être pris à l'intérieur d'un identifiant plus long
//!   ni d'un nombre.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::alphabet::{
    est_identifiant, est_operateur, est_parenthese, est_reconnu, DECLENCHEUR_DEFAUT,
};
use super::erreurs::CatalogueErreur;
use super::jetons::{classify, classify_canonical, frontiere_ok, Cote, Jeton};

/// Variable fournie par l'hôte (format JSON : name / code / value).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(rename = "name")]
    pub nom: String,
    pub code: String,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub valeur: Option<f64>,
}

impl Variable {
    pub fn new(nom: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            code: code.into(),
            valeur: None,
        }
    }

    pub fn avec_valeur(mut self, valeur: f64) -> Self {
        self.valeur = Some(valeur);
        self
    }
}

/// Catalogue validé + ordres de recherche précalculés (longueur décroissante).
#[derive(Clone, Debug)]
pub struct Catalogue {
    variables: Vec<Variable>,
    declencheur: char,
    noms: Vec<Vec<char>>,
    codes: Vec<Vec<char>>,
    ordre_noms: Vec<usize>,
    ordre_codes: Vec<usize>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::vide()
    }
}

impl Catalogue {
    pub fn vide() -> Self {
        Self {
            variables: Vec::new(),
            declencheur: DECLENCHEUR_DEFAUT,
            noms: Vec::new(),
            codes: Vec::new(),
            ordre_noms: Vec::new(),
            ordre_codes: Vec::new(),
        }
    }

    /// Catalogue avec le déclencheur par défaut (`@`).
    pub fn new(variables: Vec<Variable>) -> Result<Self, CatalogueErreur> {
        Self::avec_declencheur(variables, DECLENCHEUR_DEFAUT)
    }

    /// Valide la précondition de non-chevauchement puis précalcule les ordres.
    ///
    /// Règles :
    /// - nom : non vide, ne commence ni par un chiffre ni par un point, sans opérateur,
    ///   parenthèse ni point, différent du déclencheur seul ;
    /// - code : identifiant (lettres, chiffres, `_`) qui ne commence pas par un chiffre ;
    /// - aucun nom (resp. code) ne peut être reconnu à l'intérieur d'un autre.
    pub fn avec_declencheur(
        variables: Vec<Variable>,
        declencheur: char,
    ) -> Result<Self, CatalogueErreur> {
        if est_reconnu(declencheur) || est_identifiant(declencheur) || declencheur.is_whitespace() {
            return Err(CatalogueErreur::DeclencheurAmbigu { declencheur });
        }
        for (index, v) in variables.iter().enumerate() {
            verifier_nom(index, v, declencheur)?;
            verifier_code(v)?;
        }

        let noms: Vec<Vec<char>> = variables.iter().map(|v| v.nom.chars().collect()).collect();
        let codes: Vec<Vec<char>> = variables.iter().map(|v| v.code.chars().collect()).collect();

        for (a, court) in noms.iter().enumerate() {
            for (b, long) in noms.iter().enumerate() {
                if a != b && reconnu_dans(court, long) {
                    return Err(CatalogueErreur::NomsChevauchants {
                        court: variables[a].nom.clone(),
                        long: variables[b].nom.clone(),
                    });
                }
            }
        }
        for (a, court) in codes.iter().enumerate() {
            for (b, long) in codes.iter().enumerate() {
                if a != b && reconnu_dans(court, long) {
                    return Err(CatalogueErreur::CodesChevauchants {
                        court: variables[a].code.clone(),
                        long: variables[b].code.clone(),
                    });
                }
            }
        }

        let ordre_noms = ordre_decroissant(&noms);
        let ordre_codes = ordre_decroissant(&codes);

        tracing::debug!(
            variables = variables.len(),
            declencheur = %declencheur,
            "catalogue construit"
        );

        Ok(Self {
            variables,
            declencheur,
            noms,
            codes,
            ordre_noms,
            ordre_codes,
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn declencheur(&self) -> char {
        self.declencheur
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Motifs à reconnaître, du plus long au plus court.
    pub(crate) fn motifs(&self, cote: Cote) -> impl Iterator<Item = (usize, &[char])> + '_ {
        let (ordre, motifs) = match cote {
            Cote::Noms => (&self.ordre_noms, &self.noms),
            Cote::Codes => (&self.ordre_codes, &self.codes),
        };
        ordre.iter().map(move |&i| (i, motifs[i].as_slice()))
    }

    /// code → valeur, pour les variables qui en portent une.
    pub fn valeurs(&self) -> HashMap<String, f64> {
        self.variables
            .iter()
            .filter_map(|v| v.valeur.map(|x| (v.code.clone(), x)))
            .collect()
    }
}

fn verifier_nom(index: usize, v: &Variable, declencheur: char) -> Result<(), CatalogueErreur> {
    let Some(premier) = v.nom.chars().next() else {
        return Err(CatalogueErreur::NomVide { index });
    };
    let ambigu = premier.is_ascii_digit()
        || v.nom.chars().any(|c| c == '.' || est_operateur(c) || est_parenthese(c))
        || v.nom.chars().eq(std::iter::once(declencheur));
    if ambigu {
        return Err(CatalogueErreur::NomAmbigu { nom: v.nom.clone() });
    }
    Ok(())
}

fn verifier_code(v: &Variable) -> Result<(), CatalogueErreur> {
    let Some(premier) = v.code.chars().next() else {
        return Err(CatalogueErreur::CodeVide { nom: v.nom.clone() });
    };
    if premier.is_ascii_digit() || !v.code.chars().all(est_identifiant) {
        return Err(CatalogueErreur::CodeAmbigu {
            code: v.code.clone(),
        });
    }
    Ok(())
}

/// Vrai si `court` serait reconnu quelque part dans `long` (frontières comprises).
fn reconnu_dans(court: &[char], long: &[char]) -> bool {
    if court.len() > long.len() {
        return false;
    }
    (0..=long.len() - court.len())
        .any(|i| long[i..i + court.len()] == *court && frontiere_ok(long, i, i + court.len(), court))
}

fn ordre_decroissant(motifs: &[Vec<char>]) -> Vec<usize> {
    let mut ordre: Vec<usize> = (0..motifs.len()).collect();
    // tri stable : à longueur égale, l'ordre du catalogue est conservé
    ordre.sort_by(|&a, &b| motifs[b].len().cmp(&motifs[a].len()));
    ordre
}

/* ------------------------ Substitution ------------------------ */

/// Affichage → canonique (noms remplacés par les codes).
pub fn to_canonical(affichage: &str, catalogue: &Catalogue) -> String {
    substituer(&classify(affichage, catalogue), catalogue, |v| v.code.as_str())
}

/// Canonique → affichage (codes remplacés par les noms).
pub fn to_display(canonique: &str, catalogue: &Catalogue) -> String {
    substituer(&classify_canonical(canonique, catalogue), catalogue, |v| v.nom.as_str())
}

fn substituer<'a>(
    jetons: &[Jeton],
    catalogue: &'a Catalogue,
    remplacement: impl Fn(&'a Variable) -> &'a str,
) -> String {
    let mut out = String::new();
    for j in jetons {
        match j.variable.and_then(|i| catalogue.get(i)) {
            Some(v) => out.push_str(remplacement(v)),
            None => out.push_str(&j.texte),
        }
    }
    out
}

/* ------------------------ Sélecteur (recherche) ------------------------ */

/// Filtre insensible à la casse sur le nom ou le code (recherche vide = tout).
pub fn filtrer<'a>(recherche: &str, catalogue: &'a Catalogue) -> Vec<(usize, &'a Variable)> {
    let r = recherche.trim().to_lowercase();
    catalogue
        .variables()
        .iter()
        .enumerate()
        .filter(|(_, v)| {
            r.is_empty() || v.nom.to_lowercase().contains(&r) || v.code.to_lowercase().contains(&r)
        })
        .collect()
}
