// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// - Même AppFormule (etat.rs) pour natif + wasm
// - La formule n'est PAS un TextEdit : chaque frappe passe par le noyau (admission)
// - Clavier : texte, flèches, Début/Fin, Retour arrière/Suppr, Ctrl+Z/Ctrl+Y, Entrée
// - Tactile : pavé de gros boutons, même chemin que le clavier
// - Sélecteur de variables ouvert tant qu'un déclencheur attend

use eframe::egui;
use eframe::egui::text::LayoutJob;

use crate::noyau::parentheses::paire_au_curseur;
use crate::noyau::{Direction, EtatParenthese, Genre, Jeton};

use super::etat::AppFormule;

/// Taille de la formule affichée.
const TAILLE_FORMULE: f32 = 20.0;

impl AppFormule {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.clavier(ui.ctx());

        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Éditeur de formules");
                ui.add_space(6.0);

                self.ui_formule(ui);

                if self.selecteur_ouvert() {
                    ui.add_space(6.0);
                    self.ui_selecteur(ui);
                }

                ui.add_space(8.0);
                self.ui_touches(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
            });
    }

    /* ------------------------ Clavier ------------------------ */

    fn clavier(&mut self, ctx: &egui::Context) {
        // La recherche du sélecteur a le focus : on lui laisse le clavier.
        if ctx.wants_keyboard_input() {
            return;
        }

        let evenements = ctx.input(|i| i.events.clone());
        for ev in evenements {
            match ev {
                egui::Event::Text(texte) | egui::Event::Paste(texte) => {
                    for c in texte.chars() {
                        // refusée avec le sélecteur ouvert : la frappe va à la recherche
                        if !self.saisir(c) && self.selecteur_ouvert() && !c.is_control() {
                            self.recherche.push(c);
                        }
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => self.touche(key, modifiers),
                _ => {}
            }
        }
    }

    fn touche(&mut self, key: egui::Key, modifiers: egui::Modifiers) {
        use egui::Key;

        match key {
            Key::ArrowLeft => self.deplacer(Direction::Gauche),
            Key::ArrowRight => self.deplacer(Direction::Droite),
            Key::Home => self.debut(),
            Key::End => self.fin(),
            Key::Backspace if self.selecteur_ouvert() && !self.recherche.is_empty() => {
                self.recherche.pop();
            }
            Key::Backspace => {
                self.effacer_avant();
            }
            Key::Delete => {
                self.effacer_apres();
            }
            Key::Enter if self.selecteur_ouvert() => self.inserer_premiere(),
            Key::Enter => self.valider(),
            Key::Z if modifiers.command && modifiers.shift => self.retablir(),
            Key::Z if modifiers.command => self.annuler(),
            Key::Y if modifiers.command => self.retablir(),
            _ => {}
        }
    }

    /* ------------------------ Formule ------------------------ */

    fn ui_formule(&mut self, ui: &mut egui::Ui) {
        ui.label("Formule :");

        let job = self.mise_en_forme(ui);
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(job);
            });

        ui.add_space(4.0);
        ui.label("Formule réelle :");
        Self::champ_monospace(ui, "formule_reelle", &self.tampon.canonique, 1);
    }

    /// Texte d'affichage coloré : parenthèses par profondeur, orphelines en erreur,
    /// paire courante soulignée, curseur matérialisé par '|'.
    fn mise_en_forme(&self, ui: &egui::Ui) -> LayoutJob {
        let visuels = ui.visuals();
        let police = egui::FontId::monospace(TAILLE_FORMULE);
        let normal = visuels.text_color();
        let jetons = self.tampon.jetons(&self.catalogue);
        let paire = paire_au_curseur(&jetons, self.tampon.curseur);

        let format_de = |j: &Jeton| {
            let mut f = egui::TextFormat {
                font_id: police.clone(),
                color: normal,
                ..Default::default()
            };
            match (j.genre, j.parenthese) {
                (Genre::Parenthese, Some(EtatParenthese::Orpheline)) | (Genre::Invalide, _) => {
                    f.color = visuels.error_fg_color;
                }
                (Genre::Parenthese, Some(EtatParenthese::Appariee { profondeur, .. })) => {
                    if self.reglages.couleurs_parentheses {
                        f.color = self.reglages.couleur(profondeur);
                    }
                    if let Some((ouvrante, fermante)) = paire {
                        if j.debut == ouvrante || j.debut == fermante {
                            f.underline = egui::Stroke::new(2.0, f.color);
                        }
                    }
                }
                (Genre::Variable, _) => f.color = visuels.hyperlink_color,
                (Genre::Declencheur, _) => f.color = visuels.warn_fg_color,
                _ => {}
            }
            f
        };

        let caret = egui::TextFormat {
            font_id: police.clone(),
            color: visuels.strong_text_color(),
            ..Default::default()
        };

        let mut job = LayoutJob::default();
        let curseur = self.tampon.curseur;
        for j in &jetons {
            let f = format_de(j);
            if j.debut < curseur && curseur < j.fin {
                // curseur dans un nombre : on coupe le jeton
                let coupe = curseur - j.debut;
                let gauche: String = j.texte.chars().take(coupe).collect();
                let droite: String = j.texte.chars().skip(coupe).collect();
                job.append(&gauche, 0.0, f.clone());
                job.append("|", 0.0, caret.clone());
                job.append(&droite, 0.0, f);
                continue;
            }
            if j.debut == curseur {
                job.append("|", 0.0, caret.clone());
            }
            job.append(&j.texte, 0.0, f);
        }
        if curseur >= self.tampon.longueur() {
            job.append("|", 0.0, caret);
        }
        job
    }

    /* ------------------------ Sélecteur de variables ------------------------ */

    fn ui_selecteur(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label("Variables :");

            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.recherche)
                    .desired_width(ui.available_width())
                    .hint_text("Rechercher…")
                    .id_salt("recherche_variables"),
            );

            let liste: Vec<(usize, String, String)> = self
                .variables_filtrees()
                .into_iter()
                .map(|(i, v)| (i, v.nom.clone(), v.code.clone()))
                .collect();

            if liste.is_empty() {
                ui.weak("aucune variable");
                return;
            }

            let entree = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if entree {
                self.inserer_premiere();
                return;
            }

            for (index, nom, code) in liste {
                let clic = ui
                    .horizontal(|ui| {
                        let b = ui.add_sized([160.0, 26.0], egui::Button::new(nom.as_str()));
                        ui.weak(code.as_str());
                        b.clicked()
                    })
                    .inner;
                if clic {
                    self.inserer_variable(index);
                    break;
                }
            }
        });
    }

    /// Première variable de la liste filtrée.
    fn inserer_premiere(&mut self) {
        let premiere = self.variables_filtrees().first().map(|(i, _)| *i);
        if let Some(i) = premiere {
            self.inserer_variable(i);
        }
    }

    /* ------------------------ Touches ------------------------ */

    fn ui_touches(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            self.bouton_touche(ui, "(", '(');
            self.bouton_touche(ui, ")", ')');
            self.bouton_touche(ui, "+", '+');
            self.bouton_touche(ui, "-", '-');
            self.bouton_touche(ui, "*", '*');
            self.bouton_touche(ui, "/", '/');

            ui.separator();

            let declencheur = self.catalogue.declencheur();
            self.bouton_touche(ui, &declencheur.to_string(), declencheur);

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.valider();
            }
        });

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            self.bouton_action(ui, "←", "Jeton précédent", Action::Gauche);
            self.bouton_action(ui, "→", "Jeton suivant", Action::Droite);
            self.bouton_action(ui, "DEL", "Efface le jeton avant le curseur", Action::EffacerAvant);
            self.bouton_action(ui, "SUPPR", "Efface le jeton après le curseur", Action::EffacerApres);
            self.bouton_action(ui, "C", "Vide la formule", Action::Vider);

            ui.separator();

            if ui
                .add_enabled(self.historique.peut_annuler(), egui::Button::new("↶"))
                .on_hover_text("Annuler (Ctrl+Z)")
                .clicked()
            {
                self.annuler();
            }
            if ui
                .add_enabled(self.historique.peut_retablir(), egui::Button::new("↷"))
                .on_hover_text("Rétablir (Ctrl+Y)")
                .clicked()
            {
                self.retablir();
            }

            if self.chemin_reglages.is_some() {
                ui.separator();
                if ui
                    .button("Enregistrer")
                    .on_hover_text("Formule de départ dans le fichier de réglages")
                    .clicked()
                {
                    self.statut = match self.enregistrer_formule() {
                        Ok(()) => "formule enregistrée".into(),
                        Err(e) => e.to_string(),
                    };
                }
            }
        });

        ui.add_space(8.0);
        self.ui_pave_numerique(ui);
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique_formules")
            .num_columns(3)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for ligne in [['7', '8', '9'], ['4', '5', '6'], ['1', '2', '3']] {
                    for c in ligne {
                        self.bouton_touche(ui, &c.to_string(), c);
                    }
                    ui.end_row();
                }
                self.bouton_touche(ui, "0", '0');
                self.bouton_touche(ui, ".", '.');
                ui.label("");
                ui.end_row();
            });
    }

    /* ------------------------ Sorties ------------------------ */

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.label("Résultat :");
        match &self.apercu {
            Some(v) => Self::champ_monospace(ui, "apercu_out", v, 1),
            None => Self::champ_monospace(ui, "apercu_out", "indisponible", 1),
        }

        if !self.erreur.is_empty() && !self.tampon.affichage.is_empty() {
            ui.add_space(4.0);
            ui.colored_label(ui.visuals().warn_fg_color, &self.erreur);
        }

        if let Some(v) = &self.validation {
            ui.add_space(6.0);
            let couleur = if v.valide {
                egui::Color32::from_rgb(0x67, 0xC2, 0x3A)
            } else {
                ui.visuals().error_fg_color
            };
            let message = match v.position {
                Some(p) => format!("{} (position {p})", v.message),
                None => v.message.clone(),
            };
            ui.colored_label(couleur, message);
        }

        if !self.statut.is_empty() {
            ui.add_space(4.0);
            ui.weak(self.statut.as_str());
        }
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &self.demarche.rpn);
                Self::champ_demarche(ui, "Exact", "demarche_exact", &self.demarche.exact);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    /* ------------------------ Boutons ------------------------ */

    fn bouton_touche(&mut self, ui: &mut egui::Ui, label: &str, c: char) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            self.saisir(c);
        }
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::Gauche => self.deplacer(Direction::Gauche),
                Action::Droite => self.deplacer(Direction::Droite),
                Action::EffacerAvant => {
                    self.effacer_avant();
                }
                Action::EffacerApres => {
                    self.effacer_apres();
                }
                Action::Vider => self.effacer_tout(),
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Gauche,
    Droite,
    EffacerAvant,
    EffacerApres,
    Vider,
}
