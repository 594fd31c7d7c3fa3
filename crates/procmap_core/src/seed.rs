//! Demo data for empty stores.
//!
//! Everything goes through the services, so seeded data obeys the same
//! rules as user input.

use crate::model::area::{Area, NewArea};
use crate::model::process::{NewProcess, ProcessType};
use crate::repo::store::Store;
use crate::service::area_service::AreaService;
use crate::service::error::{Conflict, ServiceError, ServiceResult};
use crate::service::process_service::ProcessService;
use log::{info, warn};

struct SeedProcess {
    name: &'static str,
    description: &'static str,
    kind: ProcessType,
    tools: Option<&'static str>,
    responsible: Option<&'static str>,
    documentation: Option<&'static str>,
}

struct SeedArea {
    name: &'static str,
    description: &'static str,
    root: SeedProcess,
    subprocesses: [SeedProcess; 2],
}

const DEMO_AREAS: [SeedArea; 2] = [
    SeedArea {
        name: "Recursos Humanos",
        description: "Responsável pela gestão de pessoas.",
        root: SeedProcess {
            name: "Recrutamento e Seleção",
            description: "Processo de contratação de novos colaboradores.",
            kind: ProcessType::Manual,
            tools: Some("Trello, Gupy"),
            responsible: Some("Equipe de RH"),
            documentation: Some("Link para o manual de recrutamento"),
        },
        subprocesses: [
            SeedProcess {
                name: "Definição de perfil da vaga",
                description: "Definição dos requisitos e qualificações para a vaga.",
                kind: ProcessType::Manual,
                tools: None,
                responsible: None,
                documentation: None,
            },
            SeedProcess {
                name: "Divulgação da vaga",
                description: "Publicação da vaga em plataformas de emprego.",
                kind: ProcessType::Systemic,
                tools: Some("LinkedIn, Infojobs"),
                responsible: None,
                documentation: None,
            },
        ],
    },
    SeedArea {
        name: "Tecnologia",
        description: "Responsável pela infraestrutura e desenvolvimento de sistemas.",
        root: SeedProcess {
            name: "Desenvolvimento de Software",
            description: "Ciclo de vida de desenvolvimento de novas aplicações.",
            kind: ProcessType::Systemic,
            tools: Some("Jira, Git, VS Code"),
            responsible: Some("Equipe de Desenvolvimento"),
            documentation: Some("Confluence, Documentação de APIs"),
        },
        subprocesses: [
            SeedProcess {
                name: "Levantamento de Requisitos",
                description: "Coleta e análise das necessidades dos usuários.",
                kind: ProcessType::Manual,
                tools: None,
                responsible: None,
                documentation: None,
            },
            SeedProcess {
                name: "Codificação",
                description: "Implementação do código fonte.",
                kind: ProcessType::Systemic,
                tools: None,
                responsible: None,
                documentation: None,
            },
        ],
    },
];

/// Seeds two demo areas, each with one root process and two subprocesses.
///
/// Refuses with `Conflict` when the store already holds any area. The whole
/// seed is one `Store::atomically` unit, so a failure leaves nothing behind.
pub fn seed_demo_data<S: Store + Clone>(store: &S) -> ServiceResult<Vec<Area>> {
    seed_areas(store, &DEMO_AREAS)
}

fn seed_areas<S: Store + Clone>(store: &S, seeds: &[SeedArea]) -> ServiceResult<Vec<Area>> {
    let areas = AreaService::new(store.clone());
    let processes = ProcessService::new(store.clone());

    let result = store.atomically(|| -> ServiceResult<Vec<Area>> {
        let existing = areas.count_areas()?;
        if existing > 0 {
            return Err(ServiceError::Conflict(Conflict::Constraint(format!(
                "store already holds {existing} area(s); seeding requires an empty store"
            ))));
        }

        let mut created = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let area =
                areas.create_area(NewArea::new(seed.name).with_description(seed.description))?;
            let root = processes.create_process(seed_input(&seed.root, &area))?;
            for subprocess in &seed.subprocesses {
                processes.create_process(seed_input(subprocess, &area).under(root.id))?;
            }
            created.push(area);
        }
        Ok(created)
    });

    match &result {
        Ok(created) => info!("event=seed module=seed status=ok areas={}", created.len()),
        Err(err) => warn!(
            "event=seed module=seed status=rejected kind={}",
            err.kind().as_str()
        ),
    }
    result
}

fn seed_input(seed: &SeedProcess, area: &Area) -> NewProcess {
    NewProcess {
        tools: seed.tools.map(str::to_string),
        responsible: seed.responsible.map(str::to_string),
        documentation: seed.documentation.map(str::to_string),
        ..NewProcess::new(seed.name, area.id, seed.kind).with_description(seed.description)
    }
}
