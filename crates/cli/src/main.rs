use clap::{Parser, Subcommand};
use pds_core::{
    sandbox_patient_description, Environment, NhsNumber, NonEmptyText, PatientDemographics,
    PdsClient, PdsConfig, PdsError, ReqwestTransport, SANDBOX_TEST_PATIENTS,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for a restricted record, distinct from ordinary failures.
const EXIT_ACCESS_DENIED: u8 = 3;

#[derive(Parser)]
#[command(name = "pds")]
#[command(about = "NHS Personal Demographics Service lookup CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more NHS numbers
    Validate {
        /// NHS numbers (quote numbers containing spaces)
        #[arg(required = true)]
        nhs_numbers: Vec<String>,
    },
    /// Look up a patient by NHS number
    Lookup {
        /// NHS number to look up
        nhs_number: String,
        /// Target environment (sandbox, int, prod)
        #[arg(long, env = "PDS_ENVIRONMENT", default_value = "sandbox")]
        environment: Environment,
        /// Bearer token (required for int and prod)
        #[arg(long, env = "PDS_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
        /// Request timeout in seconds
        #[arg(long, env = "PDS_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the sandbox test patients
    SandboxPatients,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pds=info,pds_core=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate { nhs_numbers }) => {
            let mut all_valid = true;
            for input in nhs_numbers {
                match NhsNumber::parse(&input) {
                    Ok(number) => println!("{}: valid", number.formatted()),
                    Err(e) => {
                        all_valid = false;
                        println!("{input}: invalid ({e})");
                    }
                }
            }
            if all_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Some(Commands::Lookup {
            nhs_number,
            environment,
            access_token,
            timeout_secs,
            json,
        }) => {
            let config = match PdsConfig::new(
                environment,
                NonEmptyText::from_optional(access_token),
                Duration::from_secs(timeout_secs),
            ) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            };

            tracing::info!("-- Looking up patient in {} environment", environment);

            let client = PdsClient::with_config(config, ReqwestTransport::new());
            match client.lookup_patient_blocking(&nhs_number) {
                Ok(patient) => {
                    tracing::info!("lookup complete for {}", patient.nhs_number());
                    if json {
                        match serde_json::to_string_pretty(&patient) {
                            Ok(text) => println!("{text}"),
                            Err(e) => {
                                eprintln!("Error serialising patient: {e}");
                                return ExitCode::FAILURE;
                            }
                        }
                    } else {
                        print_patient(&patient);
                    }
                    ExitCode::SUCCESS
                }
                Err(PdsError::Restricted(restricted)) => {
                    tracing::warn!(
                        nhs_number = %restricted.nhs_number(),
                        "access denied to restricted patient record"
                    );
                    eprintln!(
                        "Access denied: patient record {} is restricted",
                        restricted.nhs_number()
                    );
                    ExitCode::from(EXIT_ACCESS_DENIED)
                }
                Err(e) => {
                    tracing::error!("PDS lookup error: {:?}", e);
                    eprintln!("Error looking up patient: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(Commands::SandboxPatients) => {
            for (number, description) in SANDBOX_TEST_PATIENTS {
                println!("{number}  {description}");
            }
            ExitCode::SUCCESS
        }
        None => {
            println!("Use 'pds --help' for commands");
            ExitCode::SUCCESS
        }
    }
}

fn print_patient(patient: &PatientDemographics) {
    fn show(label: &str, value: Option<&str>) {
        println!("{label:<12} {}", value.unwrap_or("-"));
    }

    let nhs = patient.nhs_number();
    println!("{:<12} {}", "NHS number", nhs.formatted());
    if let Some(description) = sandbox_patient_description(nhs.as_str()) {
        println!("{:<12} {}", "Sandbox", description);
    }
    show("Name", patient.full_name());
    let dob = patient.date_of_birth().map(|d| d.to_string());
    show("Born", dob.as_deref());
    let age = patient.age().map(|a| a.to_string());
    show("Age", age.as_deref());
    show("Gender", patient.gender());
    show("Address", patient.address());
    show("GP", patient.gp_practice_name());
    show("GP ODS", patient.gp_practice_ods());
    if patient.is_deceased() {
        println!("{:<12} yes", "Deceased");
    }
}
