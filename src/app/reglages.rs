//! src/app/reglages.rs
//!
//! Réglages de la coque, persistés en JSON :
//! catalogue de variables, déclencheur, palette des parenthèses, options d'affichage,
//! formule de départ (texte canonique).
//!
//! Fichier absent ou illisible => valeurs par défaut + avertissement (jamais d'arrêt).

use std::path::Path;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noyau::alphabet::{DECLENCHEUR_DEFAUT, PALETTE_DEFAUT};
use crate::noyau::parentheses::indice_couleur;
use crate::noyau::{Catalogue, CatalogueErreur, Variable};

#[derive(Debug, Error)]
pub enum ReglagesErreur {
    #[error("aucun fichier de réglages (--reglages)")]
    SansFichier,

    #[error("lecture de {chemin} impossible : {source}")]
    Io {
        chemin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("réglages invalides dans {chemin} : {source}")]
    Json {
        chemin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    pub variables: Vec<Variable>,
    pub declencheur: char,
    /// Couleurs "#RRGGBB" ou "#RRGGBBAA", indexées par profondeur.
    pub palette: Vec<String>,
    pub couleurs_parentheses: bool,
    /// Aperçu du résultat à chaque frappe.
    pub apercu_direct: bool,
    /// Formule canonique chargée au démarrage.
    pub formule_initiale: Option<String>,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            declencheur: DECLENCHEUR_DEFAUT,
            palette: PALETTE_DEFAUT.iter().map(|s| s.to_string()).collect(),
            couleurs_parentheses: true,
            apercu_direct: true,
            formule_initiale: None,
        }
    }
}

impl Reglages {
    pub fn lire(chemin: &Path) -> Result<Self, ReglagesErreur> {
        let contenu = std::fs::read_to_string(chemin).map_err(|source| ReglagesErreur::Io {
            chemin: chemin.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contenu).map_err(|source| ReglagesErreur::Json {
            chemin: chemin.display().to_string(),
            source,
        })
    }

    /// Comme `lire`, avec repli sur les valeurs par défaut.
    pub fn charger(chemin: Option<&Path>) -> Self {
        let Some(chemin) = chemin else {
            tracing::debug!("aucun fichier de réglages, valeurs par défaut");
            return Self::default();
        };

        match Self::lire(chemin) {
            Ok(r) => {
                tracing::info!(
                    variables = r.variables.len(),
                    "réglages chargés depuis {}",
                    chemin.display()
                );
                r
            }
            Err(e) => {
                tracing::warn!("{e}, valeurs par défaut");
                Self::default()
            }
        }
    }

    pub fn ecrire(&self, chemin: &Path) -> Result<(), ReglagesErreur> {
        let io = |source| ReglagesErreur::Io {
            chemin: chemin.display().to_string(),
            source,
        };
        let contenu = serde_json::to_string_pretty(self).map_err(|source| ReglagesErreur::Json {
            chemin: chemin.display().to_string(),
            source,
        })?;
        std::fs::write(chemin, contenu).map_err(io)?;
        tracing::info!("réglages enregistrés dans {}", chemin.display());
        Ok(())
    }

    pub fn catalogue(&self) -> Result<Catalogue, CatalogueErreur> {
        Catalogue::avec_declencheur(self.variables.clone(), self.declencheur)
    }

    /// Catalogue validé, ou catalogue vide (avec avertissement) si les variables se chevauchent.
    pub fn catalogue_ou_vide(&self) -> Catalogue {
        self.catalogue().unwrap_or_else(|e| {
            tracing::warn!("catalogue refusé : {e}");
            Catalogue::vide()
        })
    }

    /// Couleur d'une parenthèse à cette profondeur (palette cyclique).
    /// Entrée illisible de la palette => gris.
    pub fn couleur(&self, profondeur: usize) -> Color32 {
        let palette = if self.palette.is_empty() {
            PALETTE_DEFAUT.iter().map(|s| s.to_string()).collect()
        } else {
            self.palette.clone()
        };
        let i = indice_couleur(profondeur, palette.len());
        palette
            .get(i)
            .and_then(|hex| couleur_hex(hex))
            .unwrap_or(Color32::GRAY)
    }
}

/// "#RRGGBB" / "#RRGGBBAA" -> Color32.
pub fn couleur_hex(hex: &str) -> Option<Color32> {
    let h = hex.strip_prefix('#')?;
    if !h.is_ascii() {
        return None;
    }
    let octet = |i: usize| u8::from_str_radix(h.get(i..i + 2)?, 16).ok();
    match h.len() {
        6 => Some(Color32::from_rgb(octet(0)?, octet(2)?, octet(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            octet(0)?,
            octet(2)?,
            octet(4)?,
            octet(6)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn lecture_complete() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r##"{{
                "variables": [
                    {{"name": "@Revenue", "code": "rev", "value": 1200}},
                    {{"name": "@Cost", "code": "cost"}}
                ],
                "declencheur": "#",
                "apercu_direct": false
            }}"##
        )
        .unwrap();

        let r = Reglages::lire(f.path()).unwrap();
        assert_eq!(r.variables.len(), 2);
        assert_eq!(r.variables[0].valeur, Some(1200.0));
        assert_eq!(r.declencheur, '#');
        assert!(!r.apercu_direct);
        // champs absents : valeurs par défaut
        assert!(r.couleurs_parentheses);
        assert_eq!(r.palette.len(), PALETTE_DEFAUT.len());

        let cat = r.catalogue().unwrap();
        assert_eq!(cat.declencheur(), '#');
    }

    #[test]
    fn repli_sur_defauts() {
        let dossier = tempfile::tempdir().unwrap();
        let absent = dossier.path().join("absent.json");
        assert!(matches!(Reglages::lire(&absent), Err(ReglagesErreur::Io { .. })));
        assert_eq!(Reglages::charger(Some(&absent)), Reglages::default());

        let casse = dossier.path().join("casse.json");
        std::fs::write(&casse, "{ pas du json").unwrap();
        assert!(matches!(Reglages::lire(&casse), Err(ReglagesErreur::Json { .. })));
        assert_eq!(Reglages::charger(Some(&casse)), Reglages::default());

        assert_eq!(Reglages::charger(None), Reglages::default());
    }

    #[test]
    fn ecriture_relecture() {
        let dossier = tempfile::tempdir().unwrap();
        let chemin = dossier.path().join("reglages.json");
        let r = Reglages {
            variables: vec![Variable::new("@A", "a").avec_valeur(2.5)],
            formule_initiale: Some("a*2".into()),
            ..Reglages::default()
        };
        r.ecrire(&chemin).unwrap();
        assert_eq!(Reglages::lire(&chemin).unwrap(), r);
    }

    #[test]
    fn catalogue_invalide_devient_vide() {
        let r = Reglages {
            variables: vec![Variable::new("@A", "x"), Variable::new("@B", "x")],
            ..Reglages::default()
        };
        assert!(r.catalogue().is_err());
        assert!(r.catalogue_ou_vide().is_empty());
    }

    #[test]
    fn palette_cyclique() {
        let r = Reglages::default();
        assert_eq!(r.couleur(0), Color32::from_rgba_unmultiplied(0x40, 0x9E, 0xFF, 0xCC));
        assert_eq!(r.couleur(5), r.couleur(0));
        assert_eq!(r.couleur(6), r.couleur(1));

        let r = Reglages {
            palette: vec!["#FF0000".into(), "rouge".into()],
            ..Reglages::default()
        };
        assert_eq!(r.couleur(0), Color32::from_rgb(255, 0, 0));
        assert_eq!(r.couleur(1), Color32::GRAY);
    }

    #[test]
    fn hexadecimal() {
        assert_eq!(couleur_hex("#000000"), Some(Color32::BLACK));
        assert_eq!(couleur_hex("000000"), None);
        assert_eq!(couleur_hex("#12345"), None);
        assert_eq!(couleur_hex("#GG0000"), None);
    }
}
