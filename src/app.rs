// src/app.rs
//
// Éditeur de formules : module App (racine)
// -----------------------------------------
// Rôle:
// - Déclarer les sous-modules (état, historique, réglages, vue)
// - Ré-exporter AppFormule (pour main.rs: use crate::app::AppFormule;)
// - Fournir l'impl eframe::App (compatible NATIF + WEB)
//
// Le clavier de la formule est lu dans vue.rs ; ici seulement ESC (global).

pub mod etat;
pub mod historique;
pub mod reglages;
pub mod vue;

pub use etat::AppFormule;

use eframe::egui;

impl eframe::App for AppFormule {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = vider la formule (comme bouton "C"), annulable.
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.effacer_tout();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
