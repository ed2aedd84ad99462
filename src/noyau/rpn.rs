// src/noyau/rpn.rs
//
// Jetons -> Tok -> RPN (shunting-yard) -> valeur exacte (pile itérative).
//
// Règles:
// - Moins unaire : opérateur préfixe `Neg` (précédence la plus forte), "-x" => "x neg".
//   Un '-' est unaire s'il n'arrive PAS après une valeur.
// - Multiplication implicite : une valeur (nombre, variable, '(') qui suit directement
//   une valeur reçoit un '*' : "2(3)" => "2 3 *", "(1)(2)" => "1 2 *".
// - Division par un zéro littéral détectée dès la conversion (position du '/').
// - Aucune récursion sur l'entrée : piles seulement.

use num_rational::BigRational;
use num_traits::Zero;

use super::erreurs::EchecCalcul;
use super::jetons::{Genre, Jeton};
use super::lecture::parse_decimal;
use super::variables::Catalogue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    Num(BigRational),
    /// Indice dans le catalogue.
    Var(usize),
    Plus,
    Minus,
    Star,
    Slash,
    Neg,
    LPar,
    RPar,
}

/// Jetons classés -> Tok. Refuse les jetons invalides et le déclencheur en attente.
pub fn depuis_jetons(jetons: &[Jeton]) -> Result<Vec<Tok>, EchecCalcul> {
    let mut out = Vec::with_capacity(jetons.len());

    for (i, j) in jetons.iter().enumerate() {
        let tok = match j.genre {
            Genre::Nombre => {
                let r = parse_decimal(&j.texte).ok_or(EchecCalcul::NonReconnu { position: j.debut })?;
                // "x/0" : refus direct, avant tout calcul
                let apres_slash = i > 0 && jetons[i - 1].texte == "/";
                if apres_slash && r.is_zero() {
                    return Err(EchecCalcul::DivisionParZero {
                        position: Some(jetons[i - 1].debut),
                    });
                }
                Tok::Num(r)
            }
            Genre::Variable => match j.variable {
                Some(index) => Tok::Var(index),
                None => return Err(EchecCalcul::NonReconnu { position: j.debut }),
            },
            Genre::Operateur => match j.premier() {
                Some('+') => Tok::Plus,
                Some('-') => Tok::Minus,
                Some('*') => Tok::Star,
                Some('/') => Tok::Slash,
                _ => return Err(EchecCalcul::NonReconnu { position: j.debut }),
            },
            Genre::Parenthese => {
                if j.est_ouvrante() {
                    Tok::LPar
                } else {
                    Tok::RPar
                }
            }
            Genre::Declencheur => return Err(EchecCalcul::DeclencheurEnAttente { position: j.debut }),
            Genre::Invalide => return Err(EchecCalcul::NonReconnu { position: j.debut }),
        };
        out.push(tok);
    }

    Ok(out)
}

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        _ => 0,
    }
}

/// Dépile vers la sortie tant que le sommet lie au moins aussi fort (associativité à gauche).
fn depiler(out: &mut Vec<Tok>, ops: &mut Vec<Tok>, tok: &Tok) {
    while let Some(top) = ops.last() {
        if matches!(top, Tok::LPar) || precedence(top) < precedence(tok) {
            break;
        }
        if let Some(top) = ops.pop() {
            out.push(top);
        }
    }
}

/// Convertit une suite de Tok en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Num(3), Plus, Num(4), Star, Num(2)]
///   rpn:    [Num(3), Num(4), Num(2), Star, Plus]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, EchecCalcul> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Num(_) | Tok::Var(_) | Tok::LPar => {
                if prev_was_value {
                    depiler(&mut out, &mut ops, &Tok::Star);
                    ops.push(Tok::Star);
                }
                if matches!(tok, Tok::LPar) {
                    ops.push(tok);
                    prev_was_value = false;
                } else {
                    out.push(tok);
                    prev_was_value = true;
                }
            }

            Tok::RPar => {
                if !prev_was_value {
                    return Err(EchecCalcul::Syntaxe);
                }
                // dépile jusqu’à '('
                loop {
                    match ops.pop() {
                        Some(Tok::LPar) => break,
                        Some(top) => out.push(top),
                        None => return Err(EchecCalcul::ParenthesesDesequilibrees),
                    }
                }
                prev_was_value = true;
            }

            Tok::Minus if !prev_was_value => {
                // préfixe : rien à dépiler (rien ne lie plus fort)
                ops.push(Tok::Neg);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash => {
                if !prev_was_value {
                    return Err(EchecCalcul::Syntaxe);
                }
                depiler(&mut out, &mut ops, &tok);
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Neg => {
                ops.push(Tok::Neg);
                prev_was_value = false;
            }
        }
    }

    if !prev_was_value {
        return Err(EchecCalcul::Syntaxe);
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(EchecCalcul::ParenthesesDesequilibrees);
        }
        out.push(op);
    }

    Ok(out)
}

/// Évalue une RPN sur les rationnels exacts.
/// `valeur` fournit la valeur de chaque variable (indice catalogue).
pub fn eval_rpn(
    rpn: &[Tok],
    valeur: impl Fn(usize) -> Result<BigRational, EchecCalcul>,
) -> Result<BigRational, EchecCalcul> {
    let mut st: Vec<BigRational> = Vec::new();

    for tok in rpn {
        match tok {
            Tok::Num(r) => st.push(r.clone()),
            Tok::Var(i) => st.push(valeur(*i)?),

            Tok::Neg => {
                let a = st.pop().ok_or(EchecCalcul::Syntaxe)?;
                st.push(-a);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash => {
                let b = st.pop().ok_or(EchecCalcul::Syntaxe)?;
                let a = st.pop().ok_or(EchecCalcul::Syntaxe)?;

                let r = match tok {
                    Tok::Plus => a + b,
                    Tok::Minus => a - b,
                    Tok::Star => a * b,
                    _ => {
                        if b.is_zero() {
                            return Err(EchecCalcul::DivisionParZero { position: None });
                        }
                        a / b
                    }
                };
                st.push(r);
            }

            Tok::LPar | Tok::RPar => return Err(EchecCalcul::Syntaxe),
        }
    }

    if st.len() != 1 {
        return Err(EchecCalcul::Syntaxe);
    }
    st.pop().ok_or(EchecCalcul::Syntaxe)
}

/// Format utilitaire (démarche) : RPN lisible, variables par leur code.
pub fn format_tokens(rpn: &[Tok], catalogue: &Catalogue) -> String {
    rpn.iter()
        .map(|t| match t {
            Tok::Num(r) => r.to_string(),
            Tok::Var(i) => catalogue
                .get(*i)
                .map_or_else(|| format!("#{i}"), |v| v.code.clone()),
            Tok::Plus => "+".into(),
            Tok::Minus => "-".into(),
            Tok::Star => "*".into(),
            Tok::Slash => "/".into(),
            Tok::Neg => "neg".into(),
            Tok::LPar => "(".into(),
            Tok::RPar => ")".into(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
