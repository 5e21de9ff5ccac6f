//! Initial database migration.
//!
//! Creates the academy roster tables, the treasury tables, and the
//! enums and constraints that anchor idempotent writes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACADEMY ROSTER
        // ============================================================
        db.execute_unprepared(GUARDIANS_SQL).await?;
        db.execute_unprepared(TUTORS_SQL).await?;
        db.execute_unprepared(STUDENTS_SQL).await?;
        db.execute_unprepared(COURSES_SQL).await?;
        db.execute_unprepared(COURSE_SCHEDULES_SQL).await?;
        db.execute_unprepared(ENROLLMENTS_SQL).await?;

        // ============================================================
        // PART 3: SESSIONS
        // ============================================================
        db.execute_unprepared(CLASS_SESSIONS_SQL).await?;

        // ============================================================
        // PART 4: TREASURY
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(OBLIGATIONS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(APPLICATIONS_SQL).await?;

        // ============================================================
        // PART 5: CLOSING PERIODS
        // ============================================================
        db.execute_unprepared(CLOSING_PERIODS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account ownership
CREATE TYPE account_kind AS ENUM ('guardian', 'tutor');

-- Obligation kind: what the academy is owed vs what it owes
CREATE TYPE obligation_kind AS ENUM ('charge_session', 'payout_session');

-- Obligation lifecycle
CREATE TYPE obligation_state AS ENUM ('pending', 'settled');

-- Money direction relative to the academy
CREATE TYPE payment_direction AS ENUM ('inflow', 'outflow');

-- Payment method
CREATE TYPE payment_method AS ENUM ('cash', 'transfer', 'sinpe', 'card');

-- Payment lifecycle
CREATE TYPE payment_state AS ENUM ('pending', 'completed', 'verified');

-- Class session outcome
CREATE TYPE session_state AS ENUM ('given', 'cancelled');
";

const GUARDIANS_SQL: &str = r"
CREATE TABLE guardians (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_guardians_email ON guardians(lower(email)) WHERE email IS NOT NULL;
CREATE INDEX idx_guardians_phone ON guardians(phone) WHERE phone IS NOT NULL;
";

const TUTORS_SQL: &str = r"
CREATE TABLE tutors (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const STUDENTS_SQL: &str = r"
CREATE TABLE students (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL,
    guardian_id UUID REFERENCES guardians(id),

    -- Contact as captured at intake; used to reconcile a guardian
    -- record when guardian_id is not yet linked
    guardian_name VARCHAR(255),
    guardian_email VARCHAR(255),
    guardian_phone VARCHAR(50),

    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_students_guardian ON students(guardian_id) WHERE guardian_id IS NOT NULL;
";

const COURSES_SQL: &str = r"
CREATE TABLE courses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    price NUMERIC(19, 4) NOT NULL,
    tutor_rate NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tutor_id UUID REFERENCES tutors(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_course_price_positive CHECK (price > 0),
    CONSTRAINT chk_course_tutor_rate CHECK (tutor_rate >= 0)
);
";

const COURSE_SCHEDULES_SQL: &str = r"
CREATE TABLE course_schedules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    weekday SMALLINT NOT NULL,
    start_time TIME NOT NULL,
    end_time TIME NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_schedule_weekday CHECK (weekday BETWEEN 0 AND 6),
    CONSTRAINT chk_schedule_window CHECK (end_time > start_time),
    CONSTRAINT uq_schedule_course_weekday UNIQUE (course_id, weekday)
);
";

const ENROLLMENTS_SQL: &str = r"
CREATE TABLE enrollments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    student_id UUID NOT NULL REFERENCES students(id),
    course_id UUID NOT NULL REFERENCES courses(id),
    enrolled_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_enrollment_student_course UNIQUE (student_id, course_id)
);

CREATE INDEX idx_enrollments_course ON enrollments(course_id);
";

const CLASS_SESSIONS_SQL: &str = r"
CREATE TABLE class_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    enrollment_id UUID NOT NULL REFERENCES enrollments(id),
    session_date DATE NOT NULL,
    state session_state NOT NULL,
    duration_minutes INTEGER,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- One outcome per enrollment per day; retries land on this row
    CONSTRAINT uq_session_enrollment_date UNIQUE (enrollment_id, session_date),
    CONSTRAINT chk_session_duration CHECK (duration_minutes IS NULL OR duration_minutes > 0)
);

CREATE INDEX idx_class_sessions_date ON class_sessions(session_date);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind account_kind NOT NULL,
    owner_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- One account per person; concurrent get-or-create races on this
    CONSTRAINT uq_account_kind_owner UNIQUE (kind, owner_id)
);
";

const OBLIGATIONS_SQL: &str = r"
CREATE TABLE obligations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    kind obligation_kind NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    amount NUMERIC(19, 4) NOT NULL,
    remaining NUMERIC(19, 4) NOT NULL,
    accrual_date DATE NOT NULL,
    state obligation_state NOT NULL DEFAULT 'pending',
    session_id UUID NOT NULL REFERENCES class_sessions(id),
    student_id UUID REFERENCES students(id),
    tutor_id UUID REFERENCES tutors(id),
    course_id UUID REFERENCES courses(id),
    enrollment_id UUID REFERENCES enrollments(id),
    detail VARCHAR(500) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- A session yields at most one charge and one payout
    CONSTRAINT uq_obligation_session_kind UNIQUE (session_id, kind),
    CONSTRAINT chk_obligation_amount CHECK (amount > 0),
    CONSTRAINT chk_obligation_remaining CHECK (remaining >= 0 AND remaining <= amount)
);

CREATE INDEX idx_obligations_account_pending ON obligations(account_id, accrual_date, id)
    WHERE state = 'pending';
CREATE INDEX idx_obligations_accrual_date ON obligations(accrual_date);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id),
    direction payment_direction NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    pay_date DATE NOT NULL,
    method payment_method NOT NULL,
    state payment_state NOT NULL DEFAULT 'pending',
    receipt_number VARCHAR(100),
    receipt_date DATE,
    receipt_url VARCHAR(1000),
    reference VARCHAR(255),
    detail VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_payment_amount CHECK (amount > 0)
);

-- Receipt numbers may repeat across accounts but not within one
CREATE UNIQUE INDEX uq_payments_account_receipt ON payments(account_id, receipt_number)
    WHERE receipt_number IS NOT NULL;
CREATE INDEX idx_payments_account ON payments(account_id, pay_date);
CREATE INDEX idx_payments_pay_date ON payments(pay_date) WHERE state IN ('completed', 'verified');
";

const APPLICATIONS_SQL: &str = r"
CREATE TABLE applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    obligation_id UUID NOT NULL REFERENCES obligations(id),
    payment_id UUID NOT NULL REFERENCES payments(id),
    amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_application_amount CHECK (amount > 0)
);

CREATE INDEX idx_applications_obligation ON applications(obligation_id);
CREATE INDEX idx_applications_payment ON applications(payment_id);
";

const CLOSING_PERIODS_SQL: &str = r"
CREATE TABLE closing_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    month CHAR(7) NOT NULL UNIQUE,
    closed_through DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_closing_month_format CHECK (month ~ '^[0-9]{4}-[0-9]{2}$')
);
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TABLE IF EXISTS closing_periods CASCADE;
DROP TABLE IF EXISTS applications CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS obligations CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS class_sessions CASCADE;
DROP TABLE IF EXISTS enrollments CASCADE;
DROP TABLE IF EXISTS course_schedules CASCADE;
DROP TABLE IF EXISTS courses CASCADE;
DROP TABLE IF EXISTS students CASCADE;
DROP TABLE IF EXISTS tutors CASCADE;
DROP TABLE IF EXISTS guardians CASCADE;

DROP TYPE IF EXISTS session_state CASCADE;
DROP TYPE IF EXISTS payment_state CASCADE;
DROP TYPE IF EXISTS payment_method CASCADE;
DROP TYPE IF EXISTS payment_direction CASCADE;
DROP TYPE IF EXISTS obligation_state CASCADE;
DROP TYPE IF EXISTS obligation_kind CASCADE;
DROP TYPE IF EXISTS account_kind CASCADE;
";
