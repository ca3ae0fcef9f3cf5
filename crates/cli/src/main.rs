use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use clinic_core::seed::load_seed;
use clinic_core::{
    Actor, Appointment, AppointmentPolicy, AppointmentStatus, CoreConfig, IdService,
    ListingScope, Role, ShortId, TimeSlot,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic scheduling CLI: offline policy checks and tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random identifiers
    GenerateId {
        /// How many identifiers to print
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Identifier length (1 to 22)
        #[arg(long, default_value_t = clinic_ids::DEFAULT_ID_LENGTH)]
        length: usize,
    },
    /// Check whether a booking would be approved
    CheckBooking {
        #[arg(long)]
        actor_id: ShortId,
        #[arg(long)]
        actor_role: Role,
        #[arg(long)]
        doctor_id: ShortId,
        /// Role held by the doctor record
        #[arg(long, default_value = "DOCTOR")]
        doctor_role: Role,
        #[arg(long)]
        patient_id: ShortId,
        /// Role held by the patient record
        #[arg(long, default_value = "PATIENT")]
        patient_role: Role,
        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Slot label, e.g. 09:00
        #[arg(long)]
        slot: TimeSlot,
    },
    /// Check whether a status change would be approved
    CheckTransition {
        #[arg(long)]
        actor_id: ShortId,
        #[arg(long)]
        actor_role: Role,
        /// Assigned doctor of the appointment
        #[arg(long)]
        doctor_id: ShortId,
        /// Patient of the appointment
        #[arg(long)]
        patient_id: ShortId,
        /// Current stored status
        #[arg(long)]
        from: AppointmentStatus,
        /// Requested status
        #[arg(long)]
        to: AppointmentStatus,
    },
    /// Check whether a user's appointments may be listed, and how
    CheckListing {
        #[arg(long)]
        actor_id: ShortId,
        #[arg(long)]
        actor_role: Role,
        /// User whose appointments are requested
        #[arg(long)]
        target: ShortId,
    },
    /// Check whether an actor may delete appointments
    CheckDelete {
        #[arg(long)]
        actor_role: Role,
    },
    /// Parse and validate a YAML seed file
    ValidateSeed {
        /// Path to the seed file
        file: PathBuf,
    },
}

fn run(command: Commands) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::GenerateId { count, length } => {
            let ids = IdService::new(length, 1)?;
            (0..count)
                .map(|_| ids.generate().to_string())
                .collect::<Vec<_>>()
                .join("\n")
        }
        Commands::CheckBooking {
            actor_id,
            actor_role,
            doctor_id,
            doctor_role,
            patient_id,
            patient_role,
            date,
            slot,
        } => {
            let actor = Actor::new(actor_id, actor_role);
            let doctor = Actor::new(doctor_id, doctor_role);
            let patient = Actor::new(patient_id, patient_role);
            match AppointmentPolicy::authorize_creation(&actor, &doctor, &patient, date, slot, Utc::now()) {
                Ok(draft) => format!(
                    "approved: {} with doctor {} for patient {} on {} at {}",
                    draft.status, draft.doctor_id, draft.patient_id, draft.scheduled_date, draft.slot
                ),
                Err(e) => format!("declined: {e}"),
            }
        }
        Commands::CheckTransition {
            actor_id,
            actor_role,
            doctor_id,
            patient_id,
            from,
            to,
        } => {
            let actor = Actor::new(actor_id, actor_role);
            let now = Utc::now();
            let appointment = Appointment {
                id: IdService::default().generate(),
                doctor_id,
                patient_id,
                scheduled_date: now.date_naive(),
                slot: TimeSlot::NineAm,
                status: from,
                booked_at: now,
                status_updated_at: now,
            };
            match AppointmentPolicy::authorize_transition(&actor, appointment, to, now) {
                Ok(updated) => format!("approved: {from} -> {}", updated.status),
                Err(e) => format!("declined: {e}"),
            }
        }
        Commands::CheckListing {
            actor_id,
            actor_role,
            target,
        } => {
            let actor = Actor::new(actor_id, actor_role);
            match AppointmentPolicy::authorize_scoped_listing(&actor, &target) {
                Ok(ListingScope::ByDoctor(id)) => format!("approved: appointments where doctor is {id}"),
                Ok(ListingScope::ByPatient(id)) => format!("approved: appointments where patient is {id}"),
                Err(e) => format!("declined: {e}"),
            }
        }
        Commands::CheckDelete { actor_role } => {
            // Deletion does not depend on identity.
            let actor = Actor::new(IdService::default().generate(), actor_role);
            match AppointmentPolicy::authorize_delete(&actor) {
                Ok(()) => "approved".to_string(),
                Err(e) => format!("declined: {e}"),
            }
        }
        Commands::ValidateSeed { file } => {
            let seed = load_seed(&file)?;
            // Run every entry through the same validation and uniqueness rules as startup.
            let users = clinic_core::UserService::new(
                std::sync::Arc::new(CoreConfig::default()),
                std::sync::Arc::new(clinic_core::repositories::InMemoryUsers::new()),
            );
            let count = clinic_core::seed::apply_seed(&users, seed)?;
            format!("{} is valid: {count} users", file.display())
        }
    };
    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(command) => println!("{}", run(command)?),
        None => println!("Use 'clinic --help' for commands"),
    }

    Ok(())
}
