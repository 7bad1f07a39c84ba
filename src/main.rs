use anyhow::Result;
use colored::*;
use dotenvy::dotenv;
use std::io::{self, Write};
use tracing::{error, info};

use vehicle_registry::config::environment::EnvironmentConfig;
use vehicle_registry::models::vehicle::{VehicleForm, VehicleId, VehicleRecord};
use vehicle_registry::services::auth_events::AuthEvent;
use vehicle_registry::services::report_service::{export_report, ReportFormat};
use vehicle_registry::services::vehicle_list_service::count_label;
use vehicle_registry::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuración inválida: {}", e);
            return Err(anyhow::anyhow!("Error de configuración: {}", e));
        }
    };

    // Logs a stderr para no mezclarlos con el menú
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .with_writer(io::stderr)
        .init();

    info!("🚗 Registro de Vehículos ({})", config.environment);
    info!("   API:  {}", config.api_url);
    info!("   Auth: {}", config.auth_url);

    let mut state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando la aplicación: {}", e);
            return Err(anyhow::anyhow!("Error de inicialización: {}", e));
        }
    };

    state.session.subscribe(|event| match event {
        AuthEvent::SignedIn(user) => {
            println!("{}", format!("✅ Login realizado com sucesso, {}", user.fullname).bright_green())
        }
        AuthEvent::SignedUp { .. } => println!(
            "{}",
            "✅ Cadastro realizado. Você já pode fazer login.".bright_green()
        ),
        AuthEvent::SignedOut => println!("{}", "👋 Logout realizado".bright_green()),
    });

    println!("{}", "🚗 Cadastro de Veículos".bright_blue().bold());
    println!("{}", "=======================".bright_blue());

    loop {
        let keep_going = if state.session.is_authenticated() {
            main_menu(&mut state).await?
        } else {
            login_menu(&mut state).await?
        };
        if !keep_going {
            println!("{}", "👋 Até logo!".bright_green());
            break;
        }
    }

    Ok(())
}

async fn login_menu(state: &mut AppState) -> Result<bool> {
    println!();
    println!("{}", "🔐 ACESSO".bright_cyan().bold());
    println!("{}", "=========".bright_cyan());
    println!("1. Entrar");
    println!("2. Criar conta");
    println!("3. Sair");

    match prompt("Selecione uma opção (1-3): ")?.as_str() {
        "1" => {
            let email = prompt("E-mail: ")?;
            let password = prompt("Senha: ")?;
            if let Err(e) = state.session.sign_in(&email, &password).await {
                print_error("Erro ao fazer login", &e.user_message());
            }
        }
        "2" => {
            let full_name = prompt("Nome completo: ")?;
            let email = prompt("E-mail: ")?;
            let password = prompt("Senha: ")?;
            if let Err(e) = state.session.sign_up(&email, &password, &full_name).await {
                print_error("Erro ao criar conta", &e.user_message());
            }
        }
        "3" => return Ok(false),
        _ => println!("{}", "❌ Opção inválida. Tente novamente.".bright_red()),
    }
    Ok(true)
}

async fn main_menu(state: &mut AppState) -> Result<bool> {
    let name = state
        .session
        .current_user()
        .map(|user| user.fullname.clone())
        .unwrap_or_default();

    println!();
    println!("{}", format!("📋 MENU PRINCIPAL ({})", name).bright_green().bold());
    println!("{}", "==================".bright_green());
    println!("1. ➕ Cadastrar veículo");
    println!("2. 📋 Listar veículos");
    println!("3. 🔍 Buscar");
    println!("4. ✏️  Editar veículo");
    println!("5. 🗑️  Excluir veículo");
    println!("6. 📄 Exportar PDF");
    println!("7. 📊 Exportar Excel");
    println!("8. 🚪 Logout");
    println!("9. ❌ Sair");

    match prompt("Selecione uma opção (1-9): ")?.as_str() {
        "1" => register_vehicle(state).await?,
        "2" => {
            refresh(state).await;
            print_list(state);
        }
        "3" => {
            let term = prompt("Buscar por placa, proprietário, setor ou modelo: ")?;
            if state.vehicles.vehicles().is_empty() {
                refresh(state).await;
            }
            state.vehicles.set_search_term(&term);
            print_list(state);
        }
        "4" => edit_vehicle(state).await?,
        "5" => delete_vehicle(state).await?,
        "6" => export(state, ReportFormat::Pdf).await,
        "7" => export(state, ReportFormat::Spreadsheet).await,
        "8" => state.session.sign_out(),
        "9" => return Ok(false),
        _ => println!("{}", "❌ Opção inválida. Tente novamente.".bright_red()),
    }
    Ok(true)
}

async fn register_vehicle(state: &AppState) -> Result<()> {
    println!("{}", "➕ NOVO VEÍCULO".bright_cyan().bold());
    let form = read_form(&VehicleForm::default())?;
    match state.vehicles.create(form).await {
        Ok(created) => println!(
            "{}",
            format!("✅ Veículo {} cadastrado com sucesso!", created.plate_or_empty()).bright_green()
        ),
        Err(e) => print_error("Erro ao cadastrar veículo", &e.user_message()),
    }
    Ok(())
}

async fn edit_vehicle(state: &AppState) -> Result<()> {
    refresh(state).await;
    print_list(state);
    let id = VehicleId::from(prompt("ID do veículo a editar: ")?.as_str());
    let Some(current) = state.vehicles.find(&id) else {
        println!("{}", "❌ Veículo não encontrado".bright_red());
        return Ok(());
    };

    println!("{}", "✏️  Deixe em branco para manter o valor atual".bright_blue());
    let form = read_form(&VehicleForm::from_record(&current))?;
    match state.vehicles.update(&id, form).await {
        Ok(_) => {
            println!("{}", "✅ Veículo atualizado com sucesso!".bright_green());
            refresh(state).await;
        }
        Err(e) => print_error("Erro ao atualizar veículo", &e.user_message()),
    }
    Ok(())
}

async fn delete_vehicle(state: &AppState) -> Result<()> {
    refresh(state).await;
    print_list(state);
    let id = VehicleId::from(prompt("ID do veículo a excluir: ")?.as_str());
    let confirm = prompt(&format!("Tem certeza que deseja excluir o veículo {}? (s/N): ", id))?;
    if !confirm.eq_ignore_ascii_case("s") {
        return Ok(());
    }

    match state.vehicles.remove(&id).await {
        Ok(_) => {
            println!("{}", "✅ Veículo excluído".bright_green());
            print_list(state);
        }
        Err(e) => print_error("Erro ao excluir veículo", &e.user_message()),
    }
    Ok(())
}

async fn export(state: &AppState, format: ReportFormat) {
    if state.vehicles.vehicles().is_empty() {
        refresh(state).await;
    }
    let records = state.vehicles.filtered();
    match export_report(&state.config.export_dir, format, &records) {
        Ok(path) => println!(
            "{}",
            format!("✅ {} gerado: {}", format.label(), path.display()).bright_green()
        ),
        Err(e) => print_error("Erro ao exportar", &e.user_message()),
    }
}

async fn refresh(state: &AppState) {
    if let Err(e) = state.vehicles.load().await {
        print_error("Erro ao carregar veículos", &e.user_message());
    }
}

fn print_list(state: &AppState) {
    let vehicles = state.vehicles.filtered();
    println!();
    println!("{}", count_label(vehicles.len()).bright_blue().bold());
    if vehicles.is_empty() {
        println!("Nenhum veículo encontrado");
        return;
    }
    println!(
        "{}",
        format!(
            "{:<6} {:<9} {:<14} {:<10} {:<22} {:<12} {:<8}",
            "ID", "Placa", "Modelo", "Cor", "Proprietário", "Setor", "Ramal"
        )
        .bold()
    );
    for vehicle in &vehicles {
        print_row(vehicle);
    }
}

fn print_row(v: &VehicleRecord) {
    let text = |field: &Option<String>| field.clone().unwrap_or_default();
    println!(
        "{:<6} {:<9} {:<14} {:<10} {:<22} {:<12} {:<8}",
        v.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        v.plate_or_empty(),
        text(&v.model),
        text(&v.color),
        text(&v.owner_name),
        text(&v.department),
        text(&v.extension),
    );
}

/// Cada campo se pide con su valor actual; Enter lo conserva
fn read_form(current: &VehicleForm) -> Result<VehicleForm> {
    let field = |label: &str, value: &str| -> Result<String> {
        let label = if value.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, value)
        };
        let input = prompt(&label)?;
        Ok(if input.is_empty() { value.to_string() } else { input })
    };

    Ok(VehicleForm {
        owner_name: field("Nome do proprietário", &current.owner_name)?,
        extension: field("Ramal", &current.extension)?,
        department: field("Setor", &current.department)?,
        plate: field("Placa", &current.plate)?,
        model: field("Modelo", &current.model)?,
        color: field("Cor", &current.color)?,
    })
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn print_error(title: &str, message: &str) {
    println!("{} {}", format!("❌ {}:", title).bright_red().bold(), message);
}
